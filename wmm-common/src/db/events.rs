//! Calendar event queries
//!
//! Events are local to this database. Each event may point at one setlist,
//! carry role assignments (member + role) and a roster of members.

use super::models::{non_blank, Assignment, Event, EventInput, Member};
use crate::{Error, Result};
use chrono::{NaiveDate, NaiveTime};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use uuid::Uuid;

const EVENT_SELECT: &str = r#"
    SELECT e.guid, e.name, e.event_date, e.start_time, e.end_time, e.event_type,
           e.notes, e.setlist_id, sl.name AS setlist_name, e.created_at, e.updated_at
    FROM events e
    LEFT JOIN setlists sl ON sl.guid = e.setlist_id
"#;

fn event_from_row(row: &SqliteRow) -> Event {
    Event {
        guid: row.get("guid"),
        name: row.get("name"),
        event_date: row.get("event_date"),
        start_time: row.get("start_time"),
        end_time: row.get("end_time"),
        event_type: row.get("event_type"),
        notes: row.get("notes"),
        setlist_id: row.get("setlist_id"),
        setlist_name: row.get("setlist_name"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Accept `HH:MM` or `HH:MM:SS`, stored as `HH:MM`
fn normalize_time(value: Option<&str>, field: &str) -> Result<Option<String>> {
    let Some(text) = non_blank(value) else {
        return Ok(None);
    };
    NaiveTime::parse_from_str(&text, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(&text, "%H:%M:%S"))
        .map(|t| Some(t.format("%H:%M").to_string()))
        .map_err(|_| Error::InvalidInput(format!("Invalid {}: {}", field, text)))
}

/// Validated column values for an insert or update
struct EventFields {
    name: String,
    start_time: Option<String>,
    end_time: Option<String>,
    event_type: Option<String>,
    notes: Option<String>,
    setlist_id: Option<String>,
}

async fn validate(conn: &mut SqliteConnection, input: &EventInput) -> Result<EventFields> {
    let name = non_blank(Some(&input.name))
        .ok_or_else(|| Error::InvalidInput("Event name is required".to_string()))?;
    let start_time = normalize_time(input.start_time.as_deref(), "start_time")?;
    let end_time = normalize_time(input.end_time.as_deref(), "end_time")?;

    let setlist_id = non_blank(input.setlist_id.as_deref());
    if let Some(id) = &setlist_id {
        ensure_setlist(conn, id).await?;
    }

    Ok(EventFields {
        name,
        start_time,
        end_time,
        event_type: non_blank(input.event_type.as_deref()),
        notes: non_blank(input.notes.as_deref()),
        setlist_id,
    })
}

async fn ensure_setlist(conn: &mut SqliteConnection, id: &str) -> Result<()> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM setlists WHERE guid = ?)")
        .bind(id)
        .fetch_one(conn)
        .await?;
    if exists {
        Ok(())
    } else {
        Err(Error::NotFound(format!("Setlist not found: {}", id)))
    }
}

/// Events between `from` and `to` inclusive, by date then start time
pub async fn list_events(
    pool: &SqlitePool,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<Vec<Event>> {
    let sql = format!(
        "{} WHERE (? IS NULL OR e.event_date >= ?) AND (? IS NULL OR e.event_date <= ?) \
         ORDER BY e.event_date, e.start_time IS NULL, e.start_time, e.name",
        EVENT_SELECT
    );
    let rows = sqlx::query(&sql)
        .bind(from)
        .bind(from)
        .bind(to)
        .bind(to)
        .fetch_all(pool)
        .await?;
    Ok(rows.iter().map(event_from_row).collect())
}

pub async fn find_event(pool: &SqlitePool, id: &str) -> Result<Option<Event>> {
    let sql = format!("{} WHERE e.guid = ?", EVENT_SELECT);
    let row = sqlx::query(&sql).bind(id).fetch_optional(pool).await?;
    Ok(row.as_ref().map(event_from_row))
}

pub async fn get_event(pool: &SqlitePool, id: &str) -> Result<Event> {
    find_event(pool, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Event not found: {}", id)))
}

pub async fn create_event(pool: &SqlitePool, input: &EventInput) -> Result<Event> {
    let mut conn = pool.acquire().await?;
    let fields = validate(&mut conn, input).await?;
    let guid = Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO events (
            guid, name, event_date, start_time, end_time, event_type, notes, setlist_id
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&guid)
    .bind(&fields.name)
    .bind(input.event_date)
    .bind(&fields.start_time)
    .bind(&fields.end_time)
    .bind(&fields.event_type)
    .bind(&fields.notes)
    .bind(&fields.setlist_id)
    .execute(&mut *conn)
    .await?;
    drop(conn);

    get_event(pool, &guid).await
}

/// Replace every editable field of an event
pub async fn update_event(pool: &SqlitePool, id: &str, input: &EventInput) -> Result<Event> {
    let mut conn = pool.acquire().await?;
    let fields = validate(&mut conn, input).await?;

    let result = sqlx::query(
        r#"
        UPDATE events SET
            name = ?, event_date = ?, start_time = ?, end_time = ?, event_type = ?,
            notes = ?, setlist_id = ?, updated_at = CURRENT_TIMESTAMP
        WHERE guid = ?
        "#,
    )
    .bind(&fields.name)
    .bind(input.event_date)
    .bind(&fields.start_time)
    .bind(&fields.end_time)
    .bind(&fields.event_type)
    .bind(&fields.notes)
    .bind(&fields.setlist_id)
    .bind(id)
    .execute(&mut *conn)
    .await?;
    drop(conn);

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Event not found: {}", id)));
    }
    get_event(pool, id).await
}

pub async fn delete_event(pool: &SqlitePool, id: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM events WHERE guid = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Event not found: {}", id)));
    }
    Ok(())
}

/// Point an event at a setlist, or clear it with `None`
pub async fn set_setlist(pool: &SqlitePool, event_id: &str, setlist_id: Option<&str>) -> Result<Event> {
    let setlist_id = non_blank(setlist_id);
    let mut conn = pool.acquire().await?;
    if let Some(id) = &setlist_id {
        ensure_setlist(&mut conn, id).await?;
    }

    let result = sqlx::query(
        "UPDATE events SET setlist_id = ?, updated_at = CURRENT_TIMESTAMP WHERE guid = ?",
    )
    .bind(&setlist_id)
    .bind(event_id)
    .execute(&mut *conn)
    .await?;
    drop(conn);

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Event not found: {}", event_id)));
    }
    get_event(pool, event_id).await
}

async fn ensure_event(pool: &SqlitePool, id: &str) -> Result<()> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM events WHERE guid = ?)")
        .bind(id)
        .fetch_one(pool)
        .await?;
    if exists {
        Ok(())
    } else {
        Err(Error::NotFound(format!("Event not found: {}", id)))
    }
}

async fn ensure_member(pool: &SqlitePool, id: &str) -> Result<()> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM members WHERE guid = ?)")
        .bind(id)
        .fetch_one(pool)
        .await?;
    if exists {
        Ok(())
    } else {
        Err(Error::NotFound(format!("Member not found: {}", id)))
    }
}

pub async fn list_assignments(pool: &SqlitePool, event_id: &str) -> Result<Vec<Assignment>> {
    let rows = sqlx::query(
        r#"
        SELECT a.guid, a.event_id, a.member_id, m.name AS member_name, a.role
        FROM assignments a
        JOIN members m ON m.guid = a.member_id
        WHERE a.event_id = ?
        ORDER BY a.created_at, a.rowid
        "#,
    )
    .bind(event_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| Assignment {
            guid: row.get("guid"),
            event_id: row.get("event_id"),
            member_id: row.get("member_id"),
            member_name: row.get("member_name"),
            role: row.get("role"),
        })
        .collect())
}

/// Give a member a role on an event; both member and role are required
pub async fn add_assignment(
    pool: &SqlitePool,
    event_id: &str,
    member_id: &str,
    role: &str,
) -> Result<Assignment> {
    let role = non_blank(Some(role))
        .ok_or_else(|| Error::InvalidInput("Role is required".to_string()))?;
    ensure_event(pool, event_id).await?;
    ensure_member(pool, member_id).await?;

    let guid = Uuid::new_v4().to_string();
    sqlx::query("INSERT INTO assignments (guid, event_id, member_id, role) VALUES (?, ?, ?, ?)")
        .bind(&guid)
        .bind(event_id)
        .bind(member_id)
        .bind(&role)
        .execute(pool)
        .await?;

    list_assignments(pool, event_id)
        .await?
        .into_iter()
        .find(|a| a.guid == guid)
        .ok_or_else(|| Error::Internal(format!("Assignment vanished after insert: {}", guid)))
}

pub async fn remove_assignment(pool: &SqlitePool, assignment_id: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM assignments WHERE guid = ?")
        .bind(assignment_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Assignment not found: {}", assignment_id)));
    }
    Ok(())
}

/// Members rostered on an event, by name
pub async fn list_event_members(pool: &SqlitePool, event_id: &str) -> Result<Vec<Member>> {
    let rows = sqlx::query(
        r#"
        SELECT m.guid, m.name, m.email, m.role, m.created_at
        FROM event_members em
        JOIN members m ON m.guid = em.member_id
        WHERE em.event_id = ?
        ORDER BY m.name COLLATE NOCASE
        "#,
    )
    .bind(event_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| Member {
            guid: row.get("guid"),
            name: row.get("name"),
            email: row.get("email"),
            role: row.get("role"),
            created_at: row.get("created_at"),
        })
        .collect())
}

/// Replace an event's roster with exactly `member_ids`
///
/// Runs in one transaction: an unknown member leaves the roster unchanged.
/// Duplicate ids are collapsed.
pub async fn replace_event_members(
    pool: &SqlitePool,
    event_id: &str,
    member_ids: &[String],
) -> Result<Vec<Member>> {
    ensure_event(pool, event_id).await?;

    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM event_members WHERE event_id = ?")
        .bind(event_id)
        .execute(&mut *tx)
        .await?;

    for member_id in member_ids {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM members WHERE guid = ?)")
            .bind(member_id)
            .fetch_one(&mut *tx)
            .await?;
        if !exists {
            return Err(Error::NotFound(format!("Member not found: {}", member_id)));
        }
        sqlx::query("INSERT OR IGNORE INTO event_members (event_id, member_id) VALUES (?, ?)")
            .bind(event_id)
            .bind(member_id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    list_event_members(pool, event_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::members::create_member;
    use crate::db::models::NewMember;
    use crate::db::setlists::{create_setlist, delete_setlist};
    use crate::db::test_pool;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn input(name: &str, day: &str) -> EventInput {
        EventInput {
            name: name.to_string(),
            event_date: date(day),
            start_time: None,
            end_time: None,
            event_type: None,
            notes: None,
            setlist_id: None,
        }
    }

    async fn member(pool: &SqlitePool, name: &str) -> String {
        let new = NewMember {
            name: name.to_string(),
            email: None,
            role: None,
        };
        create_member(pool, &new).await.unwrap().guid
    }

    #[test]
    fn test_normalize_time() {
        assert_eq!(normalize_time(Some("9:30"), "t").unwrap().as_deref(), Some("09:30"));
        assert_eq!(normalize_time(Some("18:00:00"), "t").unwrap().as_deref(), Some("18:00"));
        assert_eq!(normalize_time(Some(" "), "t").unwrap(), None);
        assert!(normalize_time(Some("25:00"), "t").is_err());
    }

    #[tokio::test]
    async fn test_create_and_range_listing() {
        let pool = test_pool().await;
        let mut early = input("Morning Service", "2025-03-02");
        early.start_time = Some("09:00".to_string());
        let mut late = input("Evening Service", "2025-03-02");
        late.start_time = Some("18:30".to_string());

        create_event(&pool, &late).await.unwrap();
        create_event(&pool, &early).await.unwrap();
        create_event(&pool, &input("Rehearsal", "2025-04-01")).await.unwrap();

        let march = list_events(&pool, Some(date("2025-03-01")), Some(date("2025-03-31")))
            .await
            .unwrap();
        let names: Vec<&str> = march.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Morning Service", "Evening Service"]);

        let all = list_events(&pool, None, None).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_event_validation() {
        let pool = test_pool().await;
        let err = create_event(&pool, &input("  ", "2025-01-01")).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        let mut bad = input("Service", "2025-01-01");
        bad.setlist_id = Some("missing".to_string());
        assert!(matches!(
            create_event(&pool, &bad).await.unwrap_err(),
            Error::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let pool = test_pool().await;
        let event = create_event(&pool, &input("Service", "2025-01-05")).await.unwrap();

        let mut changed = input("Communion Service", "2025-01-12");
        changed.notes = Some("Bring bread".to_string());
        let updated = update_event(&pool, &event.guid, &changed).await.unwrap();
        assert_eq!(updated.name, "Communion Service");
        assert_eq!(updated.event_date, date("2025-01-12"));
        assert_eq!(updated.notes.as_deref(), Some("Bring bread"));

        delete_event(&pool, &event.guid).await.unwrap();
        assert!(matches!(
            delete_event(&pool, &event.guid).await.unwrap_err(),
            Error::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_set_setlist_and_unlink_on_delete() {
        let pool = test_pool().await;
        let event = create_event(&pool, &input("Service", "2025-01-05")).await.unwrap();
        let setlist = create_setlist(&pool, "Epiphany", None).await.unwrap();

        let linked = set_setlist(&pool, &event.guid, Some(&setlist.guid)).await.unwrap();
        assert_eq!(linked.setlist_name.as_deref(), Some("Epiphany"));

        delete_setlist(&pool, &setlist.guid).await.unwrap();
        assert!(get_event(&pool, &event.guid).await.unwrap().setlist_id.is_none());

        let cleared = set_setlist(&pool, &event.guid, None).await.unwrap();
        assert!(cleared.setlist_id.is_none());
    }

    #[tokio::test]
    async fn test_assignments() {
        let pool = test_pool().await;
        let event = create_event(&pool, &input("Service", "2025-01-05")).await.unwrap();
        let alice = member(&pool, "Alice").await;

        let assignment = add_assignment(&pool, &event.guid, &alice, "Keys").await.unwrap();
        assert_eq!(assignment.member_name, "Alice");
        assert_eq!(assignment.role, "Keys");

        assert!(matches!(
            add_assignment(&pool, &event.guid, &alice, " ").await.unwrap_err(),
            Error::InvalidInput(_)
        ));
        assert!(matches!(
            add_assignment(&pool, &event.guid, "ghost", "Drums").await.unwrap_err(),
            Error::NotFound(_)
        ));

        remove_assignment(&pool, &assignment.guid).await.unwrap();
        assert!(list_assignments(&pool, &event.guid).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_replace_event_members() {
        let pool = test_pool().await;
        let event = create_event(&pool, &input("Service", "2025-01-05")).await.unwrap();
        let alice = member(&pool, "Alice").await;
        let bob = member(&pool, "Bob").await;

        let roster = replace_event_members(&pool, &event.guid, &[bob.clone(), alice.clone(), bob.clone()])
            .await
            .unwrap();
        let names: Vec<&str> = roster.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Alice", "Bob"]);

        let err = replace_event_members(&pool, &event.guid, &[alice.clone(), "ghost".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(list_event_members(&pool, &event.guid).await.unwrap().len(), 2);

        let roster = replace_event_members(&pool, &event.guid, &[]).await.unwrap();
        assert!(roster.is_empty());
    }
}

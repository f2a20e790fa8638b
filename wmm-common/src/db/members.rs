//! Ministry member queries

use super::models::{non_blank, Member, MemberRoster, NewMember, RosteredEvent};
use super::setlists::rostered_setlist_entries;
use crate::{Error, Result};
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;
use uuid::Uuid;

/// All members, oldest first, each with the events they are rostered on
/// and those events' setlist songs
pub async fn list_members(pool: &SqlitePool) -> Result<Vec<MemberRoster>> {
    let member_rows = sqlx::query(
        "SELECT guid, name, email, role, created_at FROM members ORDER BY created_at, rowid",
    )
    .fetch_all(pool)
    .await?;

    let event_rows = sqlx::query(
        r#"
        SELECT em.member_id, e.guid, e.name, e.event_date, e.event_type,
               e.setlist_id, sl.name AS setlist_name
        FROM event_members em
        JOIN events e ON e.guid = em.event_id
        LEFT JOIN setlists sl ON sl.guid = e.setlist_id
        ORDER BY e.event_date, e.name
        "#,
    )
    .fetch_all(pool)
    .await?;

    let entries = rostered_setlist_entries(pool).await?;

    let mut events_by_member: HashMap<String, Vec<RosteredEvent>> = HashMap::new();
    for row in &event_rows {
        let setlist_id: Option<String> = row.get("setlist_id");
        let songs = setlist_id
            .as_ref()
            .and_then(|id| entries.get(id))
            .cloned()
            .unwrap_or_default();
        events_by_member
            .entry(row.get("member_id"))
            .or_default()
            .push(RosteredEvent {
                guid: row.get("guid"),
                name: row.get("name"),
                event_date: row.get("event_date"),
                event_type: row.get("event_type"),
                setlist_id,
                setlist_name: row.get("setlist_name"),
                songs,
            });
    }

    Ok(member_rows
        .iter()
        .map(|row| {
            let member = Member {
                guid: row.get("guid"),
                name: row.get("name"),
                email: row.get("email"),
                role: row.get("role"),
                created_at: row.get("created_at"),
            };
            let events = events_by_member.remove(&member.guid).unwrap_or_default();
            MemberRoster { member, events }
        })
        .collect())
}

pub async fn create_member(pool: &SqlitePool, new: &NewMember) -> Result<Member> {
    let name = non_blank(Some(&new.name))
        .ok_or_else(|| Error::InvalidInput("Member name is required".to_string()))?;
    let guid = Uuid::new_v4().to_string();

    sqlx::query("INSERT INTO members (guid, name, email, role) VALUES (?, ?, ?, ?)")
        .bind(&guid)
        .bind(&name)
        .bind(non_blank(new.email.as_deref()))
        .bind(non_blank(new.role.as_deref()))
        .execute(pool)
        .await?;

    let row = sqlx::query("SELECT guid, name, email, role, created_at FROM members WHERE guid = ?")
        .bind(&guid)
        .fetch_one(pool)
        .await?;

    Ok(Member {
        guid: row.get("guid"),
        name: row.get("name"),
        email: row.get("email"),
        role: row.get("role"),
        created_at: row.get("created_at"),
    })
}

/// Delete a member along with their assignments and roster entries
pub async fn delete_member(pool: &SqlitePool, id: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM members WHERE guid = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Member not found: {}", id)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::events::{create_event, replace_event_members, set_setlist};
    use crate::db::models::EventInput;
    use crate::db::models::NewSong;
    use crate::db::setlists::{add_song, create_setlist};
    use crate::db::songs::create_song;
    use crate::db::test_pool;
    use chrono::NaiveDate;

    fn new_member(name: &str) -> NewMember {
        NewMember {
            name: name.to_string(),
            email: Some(" ".to_string()),
            role: Some("Vocals".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_member() {
        let pool = test_pool().await;
        let member = create_member(&pool, &new_member(" Grace ")).await.unwrap();
        assert_eq!(member.name, "Grace");
        assert_eq!(member.email, None);
        assert_eq!(member.role.as_deref(), Some("Vocals"));

        let err = create_member(&pool, &new_member("")).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_delete_member() {
        let pool = test_pool().await;
        let member = create_member(&pool, &new_member("Temp")).await.unwrap();
        delete_member(&pool, &member.guid).await.unwrap();
        assert!(matches!(
            delete_member(&pool, &member.guid).await.unwrap_err(),
            Error::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_list_members_with_roster() {
        let pool = test_pool().await;
        let first = create_member(&pool, &new_member("First")).await.unwrap();
        let second = create_member(&pool, &new_member("Second")).await.unwrap();

        let event = create_event(
            &pool,
            &EventInput {
                name: "Good Friday".to_string(),
                event_date: NaiveDate::from_ymd_opt(2025, 4, 18).unwrap(),
                start_time: None,
                end_time: None,
                event_type: Some("service".to_string()),
                notes: None,
                setlist_id: None,
            },
        )
        .await
        .unwrap();
        let first_song = NewSong {
            title: "The Old Rugged Cross".to_string(),
            artist: Some("George Bennard".to_string()),
            ..NewSong::default()
        };
        let first_song = create_song(&pool, &first_song, 1).await.unwrap();
        let second_song = NewSong {
            title: "Were You There".to_string(),
            ..NewSong::default()
        };
        let second_song = create_song(&pool, &second_song, 2).await.unwrap();
        let setlist = create_setlist(&pool, "Passion", Some(second_song.guid.as_str()))
            .await
            .unwrap();
        add_song(&pool, &setlist.guid, &first_song.guid).await.unwrap();
        set_setlist(&pool, &event.guid, Some(&setlist.guid)).await.unwrap();
        replace_event_members(&pool, &event.guid, &[second.guid.clone()])
            .await
            .unwrap();

        let members = list_members(&pool).await.unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].member.guid, first.guid);
        assert!(members[0].events.is_empty());
        assert_eq!(members[1].events.len(), 1);
        assert_eq!(members[1].events[0].name, "Good Friday");
        assert_eq!(members[1].events[0].setlist_name.as_deref(), Some("Passion"));

        let songs = &members[1].events[0].songs;
        assert_eq!(songs.len(), 2);
        assert_eq!((songs[0].position, songs[0].title.as_str()), (1, "Were You There"));
        assert_eq!((songs[1].position, songs[1].title.as_str()), (2, "The Old Rugged Cross"));
        assert_eq!(songs[1].artist.as_deref(), Some("George Bennard"));
    }
}

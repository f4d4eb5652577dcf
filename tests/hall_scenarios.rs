//! End-to-end scenarios against the public API: a fresh player works through
//! a two-room hall, reveals hints, relocks, and hits a missing hall.

use puzzlehall::content::DirSource;
use puzzlehall::errors::{LoadCause, PuzzleError};
use puzzlehall::house::PuzzleHouse;
use puzzlehall::progress::MemoryBackend;
use puzzlehall::session::AccessState;
use tempfile::TempDir;

const TWO_ROOMS: &str = r#"{
    "displayName": "Nate's Puzzle Hall",
    "rooms": [
        { "id": "R0", "title": "First", "description": "Say the <b>word</b>.",
          "key": "sesame", "hints": ["Ali Baba", "Forty thieves", "Open ..."] },
        { "id": "R1", "title": "Second", "key": "dewey", "hints": ["Library"] }
    ]
}"#;

fn content_dir() -> TempDir {
    let tmp = tempfile::tempdir().expect("tempdir");
    std::fs::write(tmp.path().join("nate.json"), TWO_ROOMS).expect("write hall");
    tmp
}

fn hall_ids() -> Vec<String> {
    vec!["nate".to_string(), "missing".to_string()]
}

fn states(house: &PuzzleHouse<DirSource>) -> Vec<(String, AccessState)> {
    house
        .accessible_rooms()
        .expect("rooms")
        .into_iter()
        .map(|(room, state)| (room.id.clone(), state))
        .collect()
}

async fn fresh_house(dir: &TempDir) -> PuzzleHouse<DirSource> {
    PuzzleHouse::open(hall_ids(), DirSource::new(dir.path()), MemoryBackend::new()).await
}

#[tokio::test]
async fn scenario_a_fresh_storage() {
    let dir = content_dir();
    let house = fresh_house(&dir).await;
    assert_eq!(
        states(&house),
        vec![
            ("R0".to_string(), AccessState::Available),
            ("R1".to_string(), AccessState::Locked)
        ]
    );
}

#[tokio::test]
async fn scenario_b_correct_key_unlocks_first_room() {
    let dir = content_dir();
    let mut house = fresh_house(&dir).await;
    assert!(house.submit_key("R0", "sesame").expect("submit"));
    assert_eq!(
        states(&house),
        vec![
            ("R0".to_string(), AccessState::Completed),
            ("R1".to_string(), AccessState::Available)
        ]
    );
}

#[tokio::test]
async fn scenario_c_hints_are_capped() {
    let dir = content_dir();
    let mut house = fresh_house(&dir).await;
    house.reveal_hint("R0").expect("hint");
    house.reveal_hint("R0").expect("hint");
    let r0 = house.current_hall().expect("hall").rooms[0].clone();
    assert_eq!(house.progress().revealed_hint_count(&r0), 2);

    house.reveal_hint("R0").expect("hint");
    house.reveal_hint("R0").expect("fourth reveal is a no-op");
    assert_eq!(house.progress().revealed_hint_count(&r0), 3);
}

#[tokio::test]
async fn scenario_d_relock_from_start() {
    let dir = content_dir();
    let mut house = fresh_house(&dir).await;
    assert!(house.submit_key("R0", "sesame").expect("submit"));
    house.reveal_hint("R0").expect("hint");

    house.relock_from("R0").expect("relock");
    assert_eq!(
        states(&house),
        vec![
            ("R0".to_string(), AccessState::Available),
            ("R1".to_string(), AccessState::Locked)
        ]
    );
    let r0 = house.current_hall().expect("hall").rooms[0].clone();
    assert_eq!(house.progress().revealed_hint_count(&r0), 0);
    assert!(!house.progress().progress().revealed_hints.contains_key("R0"));
}

#[tokio::test]
async fn scenario_e_missing_hall_fails_without_changing_current() {
    let dir = content_dir();
    let mut house = fresh_house(&dir).await;
    let before = house.current_hall().cloned();

    match house.select_hall("missing").await {
        Err(PuzzleError::Load(err)) => {
            assert_eq!(err.hall_id, "missing");
            assert!(matches!(err.cause, LoadCause::Io(_)));
        }
        other => panic!("expected load error, got {:?}", other.map(|h| h.id.clone())),
    }
    assert_eq!(house.current_hall().cloned(), before);
}

#[tokio::test]
async fn key_matching_ignores_case_and_whitespace() {
    let dir = content_dir();
    let mut house = fresh_house(&dir).await;
    assert!(!house.submit_key("R0", "sesam e").expect("submit"));
    assert!(!house.submit_key("R0", "").expect("submit"));
    assert!(house.submit_key("R0", "  SeSaMe ").expect("submit"));
}

#[tokio::test]
async fn unlock_is_idempotent_after_success() {
    let dir = content_dir();
    let mut house = fresh_house(&dir).await;
    assert!(house.submit_key("R0", "sesame").expect("submit"));
    assert!(!house.submit_key("R0", "wrong").expect("submit"));
    assert!(house.submit_key("R0", "sesame").expect("submit"));
    assert!(house.progress().is_unlocked("R0"));
}

#[tokio::test]
async fn first_room_is_never_locked_and_hints_stay_in_range() {
    let dir = content_dir();
    let mut house = fresh_house(&dir).await;

    // A fixed but mixed sequence of intents
    let steps: &[(&str, &str)] = &[
        ("hint", "R0"),
        ("key", "R0"),
        ("hint", "R1"),
        ("hint", "R1"),
        ("hint", "R1"),
        ("relock", "R1"),
        ("hint", "R0"),
        ("hint", "R0"),
        ("hint", "R0"),
        ("relock", "R0"),
        ("hint", "R0"),
        ("key", "R0"),
        ("key", "R1"),
    ];
    for (action, room) in steps {
        match *action {
            "hint" => {
                house.reveal_hint(room).expect("hint");
            }
            "key" => {
                let key = if *room == "R0" { "sesame" } else { "dewey" };
                house.submit_key(room, key).expect("key");
            }
            _ => house.relock_from(room).expect("relock"),
        }

        let hall = house.current_hall().expect("hall").clone();
        for r in &hall.rooms {
            assert!(house.progress().revealed_hint_count(r) <= r.hints.len());
        }
        assert_ne!(house.accessible_rooms().expect("rooms")[0].1, AccessState::Locked);
    }
}

#[tokio::test]
async fn relock_leaves_earlier_rooms_alone() {
    let dir = content_dir();
    let mut house = fresh_house(&dir).await;
    house.submit_key("R0", "sesame").expect("submit");
    house.submit_key("R1", "dewey").expect("submit");

    house.relock_from("R1").expect("relock");
    let after = states(&house);
    assert_eq!(after[0].1, AccessState::Completed);
    assert!(matches!(after[1].1, AccessState::Available | AccessState::Locked));
}

#[test]
fn second_hall_load_keeps_both_cached() {
    tokio_test::block_on(async {
        let dir = content_dir();
        std::fs::write(
            dir.path().join("erik.json"),
            r#"{"displayName":"Erik","rooms":[{"id":"E0","key":"x"}]}"#,
        )
        .expect("write erik");
        let ids = vec!["nate".to_string(), "erik".to_string()];
        let mut house = PuzzleHouse::open(ids, DirSource::new(dir.path()), MemoryBackend::new()).await;

        house.select_hall("erik").await.expect("erik");
        std::fs::remove_file(dir.path().join("nate.json")).expect("remove nate");

        // Served from cache even though the file is gone
        let nate = house.select_hall("nate").await.expect("cached nate");
        assert_eq!(nate.display_name, "Nate's Puzzle Hall");
    });
}

//! Persists the best score when the player leaves.

use simon_rendering::FrameControl;
use simon_savefile::SaveFile;
use simon_world::{query, World};
use tracing::{info, warn};

/// Decides whether the frame loop continues, storing the best score the
/// first time an exit is requested.
///
/// `saved` records that the store was attempted; a failed store is logged
/// and not retried.
pub(crate) fn finish_frame(
    exit_requested: bool,
    save_file: &SaveFile,
    world: &World,
    saved: &mut bool,
) -> FrameControl {
    if !exit_requested {
        return FrameControl::Continue;
    }
    if !*saved {
        *saved = true;
        let best = query::best_score(world);
        match save_file.store(best) {
            Ok(()) => info!(best, path = %save_file.path().display(), "saved best score"),
            Err(error) => warn!(%error, "failed to save best score"),
        }
    }
    FrameControl::Exit
}

#[cfg(test)]
mod tests {
    use super::*;
    use simon_core::Command;
    use simon_savefile::SaveFormat;
    use simon_world as world;

    fn world_with_best(best: u32) -> World {
        let mut world = World::with_seed(4);
        let mut events = Vec::new();
        world::apply(&mut world, Command::RestoreBestScore { best }, &mut events);
        world
    }

    #[test]
    fn running_frames_do_not_touch_the_save_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let save_file = SaveFile::new(dir.path().join("simon.sav"), SaveFormat::Shifted);
        let mut saved = false;

        let control = finish_frame(false, &save_file, &world_with_best(3), &mut saved);

        assert_eq!(control, FrameControl::Continue);
        assert!(!saved);
        assert!(!save_file.path().exists());
    }

    #[test]
    fn repeated_exit_frames_store_once() {
        let dir = tempfile::tempdir().expect("temp dir");
        let save_file = SaveFile::new(dir.path().join("simon.sav"), SaveFormat::Shifted);
        let world = world_with_best(42);
        let mut saved = false;

        assert_eq!(
            finish_frame(true, &save_file, &world, &mut saved),
            FrameControl::Exit
        );
        assert!(saved);
        assert_eq!(save_file.load().expect("stored record"), 42);

        std::fs::remove_file(save_file.path()).expect("remove record");
        assert_eq!(
            finish_frame(true, &save_file, &world, &mut saved),
            FrameControl::Exit
        );
        assert!(
            !save_file.path().exists(),
            "second exit frame must not write again"
        );
    }

    #[test]
    fn failed_store_still_exits() {
        let dir = tempfile::tempdir().expect("temp dir");
        let save_file = SaveFile::new(
            dir.path().join("missing").join("simon.sav"),
            SaveFormat::Shifted,
        );
        let mut saved = false;

        let control = finish_frame(true, &save_file, &world_with_best(7), &mut saved);

        assert_eq!(control, FrameControl::Exit);
        assert!(saved, "a failed store is not retried");
        assert!(!save_file.path().exists());
    }
}

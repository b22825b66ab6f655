// winit allows one event loop per process, so this binary holds a single test.

#[cfg(feature = "integration-tests")]
use voxel_ngin::{flow, settings::Settings};

#[test]
#[cfg(feature = "integration-tests")]
fn quitting_right_after_setup_tears_everything_down() {
    let settings = Settings {
        quit_after_frames: Some(0),
        ..Settings::default()
    };

    let app = match flow::run_until_exit(settings) {
        Ok(app) => app,
        Err(e) => {
            println!("{}", e);
            panic!("{}", e);
        }
    };

    let lifecycle = app.lifecycle();
    assert_eq!(lifecycle.initializations(), 1);
    assert_eq!(lifecycle.frames(), 0);
    assert_eq!(lifecycle.phase(), flow::Phase::ShuttingDown);
    assert!(lifecycle.failure().is_none(), "{:?}", lifecycle.failure());

    let ledger = app.ledger().expect("setup should have created a GPU").clone();
    assert_eq!(ledger.total_live(), 0);
    assert_eq!(ledger.allocated(voxel_ngin::resources::ledger::ResourceKind::Program), 1);

    assert!(app.into_lifecycle().into_result().is_ok());
}

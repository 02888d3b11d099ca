use std::sync::Arc;

use webviewhost_desktop::command::Command;
use webviewhost_desktop::{WindowManager, WindowOptions};

#[test]
fn test_allocate_and_lookup() {
    let manager = WindowManager::new();
    let id = manager.allocate(WindowOptions::default());
    assert!(manager.entry(id).is_some());
    assert_eq!(manager.count(), 1);
}

#[test]
fn test_closing_a_window_is_observable_before_removal() {
    let manager = WindowManager::new();
    let id = manager.allocate(WindowOptions::default());
    assert!(!manager.is_closed(id));
    manager.mark_closed(id);
    assert!(manager.is_closed(id));
}

#[test]
fn test_unknown_window_reports_closed() {
    let manager = WindowManager::new();
    assert!(manager.is_closed(999));
}

#[test]
fn test_enqueue_is_fifo_per_window() {
    let manager = WindowManager::new();
    let id = manager.allocate(WindowOptions::default());
    manager.enqueue(id, Command::Show);
    manager.enqueue(id, Command::Hide);
    manager.enqueue(id, Command::Focus);

    let rx = manager.take_receiver();
    let (_, first) = rx.try_recv().unwrap();
    let (_, second) = rx.try_recv().unwrap();
    let (_, third) = rx.try_recv().unwrap();
    assert!(matches!(first, Command::Show));
    assert!(matches!(second, Command::Hide));
    assert!(matches!(third, Command::Focus));
}

#[test]
fn test_multiple_windows_get_distinct_ids() {
    let manager = WindowManager::new();
    let ids: Vec<_> = (0..5).map(|_| manager.allocate(WindowOptions::default())).collect();
    let unique: std::collections::HashSet<_> = ids.iter().collect();
    assert_eq!(unique.len(), ids.len());
}

#[test]
fn test_manager_is_shareable_across_handles() {
    let manager = WindowManager::new();
    let a: Arc<WindowManager> = Arc::clone(&manager);
    let id = a.allocate(WindowOptions::default());
    assert!(manager.entry(id).is_some());
}

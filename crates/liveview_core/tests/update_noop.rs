use liveview_core::{update, Identity, Msg, PageKind, PageState};

#[test]
fn update_is_noop() {
    let state = PageState::new(PageKind::Dashboard, Identity::default());
    let (next, effects) = update(state.clone(), Msg::NoOp);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn tick_does_not_dirty_state() {
    let state = PageState::new(PageKind::Chat, Identity::default());
    let (mut next, effects) = update(state, Msg::Tick);

    assert!(effects.is_empty());
    assert!(!next.consume_dirty());
}

use std::sync::Arc;

use sevterm_core::{
    DeviceClass, Document, InputEvent, Language, LanguageContext, LocalizationKey,
    MonospaceMetrics, NavigationState, ScreenConfig, ScreenEvent, TerminalScreen, Texture,
};

fn terminal(device: DeviceClass) -> TerminalScreen {
    let language = Arc::new(LanguageContext::new(Language::English, device));
    TerminalScreen::new(
        Document::terminal(),
        language,
        Arc::new(MonospaceMetrics::new(12.0, 40.0)),
        ScreenConfig::default().with_device(device),
    )
    .unwrap()
}

#[test]
fn browse_scroll_and_load_images() {
    let mut screen = terminal(DeviceClass::Pointer);
    assert_eq!(screen.navigation(), NavigationState::default());

    screen.handle_input(InputEvent::SectionPressed(1));
    assert_eq!(screen.navigation(), NavigationState { section: 1, entry: 0 });
    let body = screen
        .language()
        .resolve(Document::terminal().entry(1, 0).unwrap().body);
    assert_eq!(screen.nodes().body.text, body);

    // Out of range entry leaves everything as it was.
    let generation = screen.generation();
    assert!(!screen.handle_input(InputEvent::EntryPressed(5)));
    assert_eq!(screen.generation(), generation);

    let request = screen.take_image_requests().remove(0);
    let texture = Arc::new(Texture {
        width: 100,
        height: 1000,
        pixels: vec![0; 100 * 1000 * 4],
    });
    assert!(screen.apply_image::<String>(request.target, Ok(texture)));

    let state = *screen.scroll().state();
    assert!(state.content_travel() > 0.0);

    screen.handle_input(InputEvent::ViewportEnter);
    for _ in 0..200 {
        screen.handle_input(InputEvent::Wheel { delta_y: 120.0 });
    }
    let state = *screen.scroll().state();
    assert!((state.content_offset - (state.top_offset - state.content_travel())).abs() < 1e-3);
    assert!((screen.scroll().fraction() - 1.0).abs() < 1e-6);
    assert!((state.thumb_offset - state.thumb_track_max()).abs() < 1e-3);

    screen.handle_input(InputEvent::EntryPressed(1));
    assert_eq!(screen.scroll().fraction(), 0.0);
}

#[test]
fn keyboard_navigation_and_links() {
    let mut screen = terminal(DeviceClass::Pointer);
    screen.next_section();
    screen.next_section();
    screen.next_section();
    assert_eq!(screen.navigation().section, 3);
    screen.next_entry();
    assert_eq!(screen.navigation().entry, 1);

    screen.events().lock().clear();
    assert_eq!(
        screen.open_link().as_deref(),
        Some("https://twitter.com/Slynch2203")
    );
    assert_eq!(
        screen.events().lock().last(),
        Some(&ScreenEvent::OpenLink("https://twitter.com/Slynch2203".into()))
    );

    screen.next_section();
    assert_eq!(screen.navigation(), NavigationState::default());
    assert!(screen.open_link().is_none());
}

#[test]
fn touch_prompts_use_tap() {
    let screen = terminal(DeviceClass::Touch);
    let text = screen
        .language()
        .resolve(LocalizationKey::OldWebsiteContents);
    assert!(!text.contains("{action}"));
    assert!(text.starts_with("Tap here"));
    assert_eq!(screen.layout().scrollbar_width(), 5.0);
}

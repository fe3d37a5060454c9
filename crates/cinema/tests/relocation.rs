//! Open/close cycles against a parsed page.

use cinema::{
    CONTAINER_OVERRIDES, FRAME_OVERRIDES, InputEvent, ModalState, OVERLAY_ID,
    PLACEHOLDER_ID, RelocationController, TRIGGER_ID, trigger,
};
use dom::{DOMUpdate, Document, NodeKey, Rect};

const PAGE: &str = r#"<!doctype html>
<html><head><title>Lesson</title></head>
<body>
  <main><section><article id="lesson">
    <h1>Week 3</h1>
    <div id="player" class="video-player"><iframe src="https://player.vimeo.com/video/76979871"></iframe></div>
    <p id="notes">Notes</p>
  </article></section></main>
</body></html>"#;

struct Fixture {
    doc: Document,
    player: NodeKey,
    frame: NodeKey,
    lesson: NodeKey,
}

fn fixture() -> Fixture {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut doc = Document::parse_html(PAGE);
    let player = doc.get_element_by_id("player").unwrap();
    let frame = doc.first_descendant_by_tag(player, "iframe").unwrap();
    let lesson = doc.get_element_by_id("lesson").unwrap();
    doc.set_layout_box(player, Rect::new(0.0, 120.0, 640.0, 360.0)).unwrap();
    Fixture {
        doc,
        player,
        frame,
        lesson,
    }
}

fn bound(fx: &mut Fixture) -> RelocationController {
    let mut controller = RelocationController::default();
    controller.activate(&mut fx.doc, fx.player, "https://player.vimeo.com/video/76979871");
    controller
}

fn placeholders(doc: &Document) -> Vec<NodeKey> {
    doc.elements_with_id(PLACEHOLDER_ID)
}

fn content_slot(controller: &RelocationController) -> NodeKey {
    controller.engine().unwrap().overlay().unwrap().content()
}

#[test]
fn close_twice_restores_exactly_once() {
    let mut fx = fixture();
    let mut controller = bound(&mut fx);
    let index = fx.doc.index_in_parent(fx.player);

    assert!(controller.request_open(&mut fx.doc));
    assert!(controller.request_close(&mut fx.doc));
    assert!(!controller.request_close(&mut fx.doc));

    assert_eq!(fx.doc.parent(fx.player), Some(fx.lesson));
    assert_eq!(fx.doc.index_in_parent(fx.player), index);
    let occurrences = fx
        .doc
        .children(fx.lesson)
        .into_iter()
        .filter(|child| *child == fx.player)
        .count();
    assert_eq!(occurrences, 1);
    assert_eq!(fx.doc.attribute(fx.player, "style"), None);
    assert_eq!(fx.doc.attribute(fx.frame, "style"), None);
    assert!(placeholders(&fx.doc).is_empty());
}

#[test]
fn overrides_are_removed_not_blanked() {
    let mut fx = fixture();
    let mut controller = bound(&mut fx);

    controller.request_open(&mut fx.doc);
    let style = fx.doc.style(fx.player).unwrap();
    for entry in &CONTAINER_OVERRIDES {
        assert_eq!(style.get_property_value(entry.property), entry.value);
        assert_eq!(style.get_property_priority(entry.property), "important");
    }
    let frame_style = fx.doc.style(fx.frame).unwrap();
    for entry in &FRAME_OVERRIDES {
        assert_eq!(frame_style.get_property_value(entry.property), entry.value);
    }

    controller.request_close(&mut fx.doc);
    let style = fx.doc.style(fx.player).unwrap();
    for entry in &CONTAINER_OVERRIDES {
        assert!(!style.contains(entry.property), "{} left behind", entry.property);
    }
    let frame_style = fx.doc.style(fx.frame).unwrap();
    for entry in &FRAME_OVERRIDES {
        assert!(!frame_style.contains(entry.property), "{} left behind", entry.property);
    }
    assert!(!fx.doc.has_attribute(fx.player, "style"));
}

#[test]
fn author_styles_come_back_unchanged() {
    let mut fx = fixture();
    fx.doc
        .set_attribute(fx.player, "style", "padding-top: 56.25%; position: relative;")
        .unwrap();
    fx.doc
        .set_attribute(fx.frame, "style", "width: 640px; height: 360px;")
        .unwrap();
    let mut controller = bound(&mut fx);

    controller.request_open(&mut fx.doc);
    controller.request_close(&mut fx.doc);

    let style = fx.doc.style(fx.player).unwrap();
    assert_eq!(style.get_property_value("padding-top"), "56.25%");
    assert_eq!(style.get_property_value("position"), "relative");
    assert!(!style.contains("padding"));
    let frame_style = fx.doc.style(fx.frame).unwrap();
    assert_eq!(frame_style.get_property_value("width"), "640px");
    assert_eq!(frame_style.get_property_value("height"), "360px");
    assert!(!frame_style.contains("top"));
}

#[test]
fn shadowed_author_style_text_is_restored_exactly() {
    let mut fx = fixture();
    fx.doc
        .set_attribute(fx.player, "style", "width: 640px; color: red")
        .unwrap();
    fx.doc
        .set_attribute(fx.frame, "style", "border: 0; height: 360px; top: 2px")
        .unwrap();
    let player_before = fx.doc.attribute(fx.player, "style");
    let frame_before = fx.doc.attribute(fx.frame, "style");
    let mut controller = bound(&mut fx);

    controller.request_open(&mut fx.doc);
    let style = fx.doc.style(fx.player).unwrap();
    assert_eq!(style.get_property_value("width"), "100%");
    assert_eq!(style.get_property_priority("width"), "important");
    controller.request_close(&mut fx.doc);

    assert_eq!(player_before.as_deref(), Some("width: 640px; color: red;"));
    assert_eq!(fx.doc.attribute(fx.player, "style"), player_before);
    assert_eq!(fx.doc.attribute(fx.frame, "style"), frame_before);
}

#[test]
fn placeholder_matches_measured_box() {
    let mut fx = fixture();
    let mut controller = bound(&mut fx);
    let index = fx.doc.index_in_parent(fx.player);
    controller.request_open(&mut fx.doc);

    let placeholder = fx.doc.get_element_by_id(PLACEHOLDER_ID).unwrap();
    let style = fx.doc.style(placeholder).unwrap();
    assert_eq!(style.get_property_value("width"), "640px");
    assert_eq!(style.get_property_value("height"), "360px");
    assert_eq!(fx.doc.parent(placeholder), Some(fx.lesson));
    assert_eq!(fx.doc.index_in_parent(placeholder), index);
}

#[test]
fn parent_round_trips_at_any_depth() {
    for depth in 1..=6 {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut doc = Document::new();
        let mut parent = doc.body().unwrap();
        for _ in 0..depth {
            let wrapper = doc.create_element("div");
            doc.append_child(parent, wrapper).unwrap();
            parent = wrapper;
        }
        let before = doc.create_element("span");
        doc.append_child(parent, before).unwrap();
        let player = doc.create_element("div");
        doc.append_child(parent, player).unwrap();
        let after = doc.create_element("span");
        doc.append_child(parent, after).unwrap();

        let mut controller = RelocationController::default();
        controller.activate(&mut doc, player, "depth");
        controller.request_open(&mut doc);
        assert_eq!(doc.parent(player), Some(content_slot(&controller)));
        controller.request_close(&mut doc);

        assert_eq!(doc.parent(player), Some(parent), "depth {depth}");
        assert_eq!(doc.children(parent), vec![before, player, after]);
    }
}

#[test]
fn reopen_keeps_exactly_one_placeholder() {
    let mut fx = fixture();
    let mut controller = bound(&mut fx);

    controller.request_open(&mut fx.doc);
    let first = placeholders(&fx.doc);
    assert_eq!(first.len(), 1);

    controller.request_close(&mut fx.doc);
    assert!(placeholders(&fx.doc).is_empty());
    assert!(!fx.doc.contains_node(first[0]));

    controller.request_open(&mut fx.doc);
    let second = placeholders(&fx.doc);
    assert_eq!(second.len(), 1);
    assert_ne!(second[0], first[0]);
    assert_eq!(controller.engine().unwrap().placeholder(), Some(second[0]));
}

#[test]
fn trigger_is_hidden_only_while_open() {
    let mut fx = fixture();
    let mut controller = bound(&mut fx);
    let button = fx.doc.descendant_by_id(fx.player, TRIGGER_ID).unwrap();

    let steps = [true, true, false, false, true, false, true];
    for open in steps {
        if open {
            controller.request_open(&mut fx.doc);
        } else {
            controller.request_close(&mut fx.doc);
        }
        let expected = controller.state() == ModalState::Open;
        assert!(fx.doc.contains_node(button));
        assert_eq!(fx.doc.parent(button), Some(fx.player));
        assert_eq!(trigger::is_hidden(&fx.doc, button), expected);
    }
}

#[test]
fn container_without_frame_still_cycles() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut doc = Document::parse_html("<body><div id=wrap><div id=player><video></video></div></div></body>");
    let player = doc.get_element_by_id("player").unwrap();
    let wrap = doc.get_element_by_id("wrap").unwrap();
    let mut controller = RelocationController::default();

    controller.activate(&mut doc, player, "native");
    assert!(doc.descendant_by_id(player, TRIGGER_ID).is_some());
    controller.request_open(&mut doc);
    assert_eq!(doc.parent(player), Some(content_slot(&controller)));
    assert_eq!(placeholders(&doc).len(), 1);
    controller.request_close(&mut doc);
    assert_eq!(doc.parent(player), Some(wrap));
    assert!(placeholders(&doc).is_empty());
}

#[test]
fn orphan_container_never_fails() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut doc = Document::new();
    let player = doc.create_element("div");
    let mut controller = RelocationController::default();

    controller.activate(&mut doc, player, "orphan");
    assert_eq!(controller.engine().unwrap().original_location(), None);
    assert!(controller.request_open(&mut doc));
    assert_eq!(controller.state(), ModalState::Open);
    assert_eq!(doc.parent(player), None);
    assert!(placeholders(&doc).is_empty());
    assert!(controller.request_close(&mut doc));
    assert_eq!(doc.attribute(player, "style"), None);
    controller.teardown(&mut doc);
    assert!(doc.children(player).is_empty());
}

#[test]
fn detached_parent_leaves_container_in_overlay() {
    let mut fx = fixture();
    let mut controller = bound(&mut fx);
    controller.request_open(&mut fx.doc);
    let slot = content_slot(&controller);
    let placeholder = placeholders(&fx.doc)[0];

    // The page navigates away from the lesson while the overlay is open.
    fx.doc.detach(fx.lesson).unwrap();
    assert!(controller.request_close(&mut fx.doc));

    assert_eq!(controller.state(), ModalState::Closed);
    assert_eq!(fx.doc.parent(fx.player), Some(slot));
    assert!(fx.doc.contains_node(fx.player));
    assert!(!fx.doc.is_connected(fx.player));
    assert!(!fx.doc.contains_node(placeholder));
    assert_eq!(fx.doc.attribute(fx.player, "style"), None);
    assert_eq!(fx.doc.get_element_by_id(OVERLAY_ID), None);
}

#[test]
fn destroyed_parent_is_treated_as_already_restored() {
    let mut fx = fixture();
    let mut controller = bound(&mut fx);
    controller.request_open(&mut fx.doc);

    fx.doc.remove(fx.lesson).unwrap();
    assert!(placeholders(&fx.doc).is_empty());
    assert!(controller.request_close(&mut fx.doc));
    assert!(fx.doc.contains_node(fx.player));
    assert_eq!(fx.doc.attribute(fx.frame, "style"), None);
}

#[test]
fn container_destroyed_while_open_leaves_no_placeholder() {
    let mut fx = fixture();
    let mut controller = bound(&mut fx);
    controller.request_open(&mut fx.doc);
    assert_eq!(placeholders(&fx.doc).len(), 1);

    fx.doc.remove(fx.player).unwrap();
    assert!(controller.request_close(&mut fx.doc));
    assert_eq!(controller.state(), ModalState::Closed);
    assert!(placeholders(&fx.doc).is_empty());
    assert_eq!(fx.doc.get_element_by_id(OVERLAY_ID), None);

    controller.teardown(&mut fx.doc);
    assert!(!controller.is_bound());
    assert!(placeholders(&fx.doc).is_empty());
}

#[test]
fn container_moved_after_activation_relocates_from_its_new_parent() {
    let mut fx = fixture();
    let mut controller = bound(&mut fx);
    let body = fx.doc.body().unwrap();
    let sidebar = fx.doc.create_element("aside");
    fx.doc.append_child(body, sidebar).unwrap();
    let heading = fx.doc.create_element("h2");
    fx.doc.append_child(sidebar, heading).unwrap();
    fx.doc.append_child(sidebar, fx.player).unwrap();

    assert!(controller.request_open(&mut fx.doc));
    assert_eq!(controller.state(), ModalState::Open);
    assert_eq!(fx.doc.parent(fx.player), Some(content_slot(&controller)));
    let placeholder = placeholders(&fx.doc);
    assert_eq!(placeholder.len(), 1);
    assert_eq!(fx.doc.parent(placeholder[0]), Some(sidebar));
    assert_eq!(fx.doc.index_in_parent(placeholder[0]), Some(1));
    assert_eq!(
        controller.engine().unwrap().original_location().unwrap().parent,
        sidebar
    );

    controller.request_close(&mut fx.doc);
    assert_eq!(fx.doc.parent(fx.player), Some(sidebar));
    assert_eq!(fx.doc.index_in_parent(fx.player), Some(1));
    assert!(placeholders(&fx.doc).is_empty());
    assert!(!trigger::is_hidden(&fx.doc, controller.engine().unwrap().trigger().unwrap()));
}

#[test]
fn relocation_swaps_in_one_step() {
    let mut fx = fixture();
    let mut controller = bound(&mut fx);
    fx.doc.flush();

    controller.request_open(&mut fx.doc);
    let placeholder = placeholders(&fx.doc)[0];
    let slot = content_slot(&controller);
    let opened = fx.doc.flush();
    assert!(opened.contains(&DOMUpdate::ReplaceNode {
        parent: fx.lesson,
        old: fx.player,
        new: placeholder,
    }));
    assert!(opened.iter().any(|update| matches!(
        update,
        DOMUpdate::InsertNode { parent, node, .. } if *parent == slot && *node == fx.player
    )));
    assert!(!opened.iter().any(|update| matches!(
        update,
        DOMUpdate::DetachNode { node } | DOMUpdate::RemoveNode { node } if *node == fx.player || *node == fx.frame
    )));

    controller.request_close(&mut fx.doc);
    let closed = fx.doc.flush();
    assert!(closed.contains(&DOMUpdate::ReplaceNode {
        parent: fx.lesson,
        old: placeholder,
        new: fx.player,
    }));
    assert!(closed.contains(&DOMUpdate::RemoveNode { node: placeholder }));
    assert_eq!(fx.doc.first_descendant_by_tag(fx.player, "iframe"), Some(fx.frame));
}

#[test]
fn leftover_placeholder_is_replaced() {
    let mut fx = fixture();
    let mut controller = bound(&mut fx);
    let stale = fx.doc.create_element("div");
    fx.doc.set_attribute(stale, "id", PLACEHOLDER_ID).unwrap();
    fx.doc.append_child(fx.lesson, stale).unwrap();

    controller.request_open(&mut fx.doc);
    assert!(!fx.doc.contains_node(stale));
    assert_eq!(placeholders(&fx.doc).len(), 1);
}

#[test]
fn separated_container_is_healed_before_relocating() {
    let mut fx = fixture();
    let mut controller = bound(&mut fx);
    let index = fx.doc.index_in_parent(fx.player);

    // A previous cycle was interrupted: the slot holds a placeholder and the
    // player sits somewhere else.
    let stale = fx.doc.create_element("div");
    fx.doc.set_attribute(stale, "id", PLACEHOLDER_ID).unwrap();
    fx.doc.replace_child(fx.lesson, stale, fx.player).unwrap();
    let body = fx.doc.body().unwrap();
    fx.doc.append_child(body, fx.player).unwrap();

    controller.request_open(&mut fx.doc);
    assert!(!fx.doc.contains_node(stale));
    let placeholder = placeholders(&fx.doc);
    assert_eq!(placeholder.len(), 1);
    assert_eq!(fx.doc.index_in_parent(placeholder[0]), index);

    controller.request_close(&mut fx.doc);
    assert_eq!(fx.doc.parent(fx.player), Some(fx.lesson));
    assert_eq!(fx.doc.index_in_parent(fx.player), index);
}

#[test]
fn escape_closes_only_while_open() {
    let mut fx = fixture();
    let mut controller = bound(&mut fx);
    assert!(!controller.handle_event(&mut fx.doc, &InputEvent::key_down("Escape")));

    controller.request_open(&mut fx.doc);
    assert!(!controller.handle_event(&mut fx.doc, &InputEvent::key_down("Enter")));
    assert!(controller.handle_event(&mut fx.doc, &InputEvent::key_down("Escape")));
    assert_eq!(controller.state(), ModalState::Closed);
    assert_eq!(fx.doc.parent(fx.player), Some(fx.lesson));
}

#[test]
fn clicks_on_trigger_and_close_control() {
    let mut fx = fixture();
    let mut controller = bound(&mut fx);
    let button = fx.doc.descendant_by_id(fx.player, TRIGGER_ID).unwrap();
    let label = fx.doc.children(button)[0];

    assert!(controller.handle_event(&mut fx.doc, &InputEvent::Click { target: label }));
    assert_eq!(controller.state(), ModalState::Open);
    assert!(fx.doc.get_element_by_id(OVERLAY_ID).is_some());

    let notes = fx.doc.get_element_by_id("notes").unwrap();
    assert!(!controller.handle_event(&mut fx.doc, &InputEvent::Click { target: notes }));

    let close = controller.engine().unwrap().overlay().unwrap().close_button();
    let glyph = fx.doc.children(close)[0];
    assert!(controller.handle_event(&mut fx.doc, &InputEvent::Click { target: glyph }));
    assert_eq!(controller.state(), ModalState::Closed);
    assert_eq!(fx.doc.get_element_by_id(OVERLAY_ID), None);
}

#[test]
fn activate_is_idempotent_and_resets() {
    let mut fx = fixture();
    let mut controller = bound(&mut fx);
    controller.activate(&mut fx.doc, fx.player, "https://player.vimeo.com/video/76979871");
    let triggers = fx
        .doc
        .descendants(fx.player)
        .into_iter()
        .filter(|node| fx.doc.id(*node) == Some(TRIGGER_ID))
        .count();
    assert_eq!(triggers, 1);

    controller.request_open(&mut fx.doc);
    controller.activate(&mut fx.doc, fx.player, "https://player.vimeo.com/video/2");
    assert_eq!(controller.state(), ModalState::Closed);
    assert_eq!(controller.source(), Some("https://player.vimeo.com/video/2"));
    assert_eq!(fx.doc.parent(fx.player), Some(fx.lesson));
    assert!(placeholders(&fx.doc).is_empty());
    let button = fx.doc.descendant_by_id(fx.player, TRIGGER_ID).unwrap();
    assert!(!trigger::is_hidden(&fx.doc, button));
}

#[test]
fn binding_another_container_releases_the_first() {
    let mut fx = fixture();
    let mut controller = bound(&mut fx);
    let other = fx.doc.create_element("div");
    let body = fx.doc.body().unwrap();
    fx.doc.append_child(body, other).unwrap();

    controller.request_open(&mut fx.doc);
    controller.activate(&mut fx.doc, other, "second");
    assert_eq!(fx.doc.parent(fx.player), Some(fx.lesson));
    assert_eq!(fx.doc.descendant_by_id(fx.player, TRIGGER_ID), None);
    assert!(fx.doc.descendant_by_id(other, TRIGGER_ID).is_some());
    assert_eq!(controller.container(), Some(other));
}

#[test]
fn teardown_while_open_leaves_nothing_behind() {
    let mut fx = fixture();
    let mut controller = bound(&mut fx);
    controller.request_open(&mut fx.doc);

    controller.teardown(&mut fx.doc);
    assert!(!controller.is_bound());
    assert_eq!(fx.doc.parent(fx.player), Some(fx.lesson));
    assert_eq!(fx.doc.attribute(fx.player, "style"), None);
    assert!(placeholders(&fx.doc).is_empty());
    assert_eq!(fx.doc.get_element_by_id(TRIGGER_ID), None);
    assert_eq!(fx.doc.get_element_by_id(OVERLAY_ID), None);
    assert!(!controller.request_open(&mut fx.doc));
}

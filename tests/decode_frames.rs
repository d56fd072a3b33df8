//! Frame-level decoding scenarios driven through the public API.

use std::io::Cursor;
use std::sync::{Arc, Mutex};

use mt_touch::input::{
    ABS_MT_POSITION_X, ABS_MT_POSITION_Y, ABS_MT_SLOT, ABS_MT_TRACKING_ID, ABS_X, ABS_Y, EV_ABS,
    EV_SYN,
};
use mt_touch::{Error, EventLayout, RawEvent, TouchEvent, Touchscreen};

#[derive(Debug, Clone, PartialEq)]
struct Fired {
    event: TouchEvent,
    slot: usize,
    x: i32,
    y: i32,
    last_x: i32,
    valid: bool,
}

type Log = Arc<Mutex<Vec<Fired>>>;

fn abs(code: u16, value: i32) -> RawEvent {
    RawEvent::new(EV_ABS, code, value)
}

fn syn() -> RawEvent {
    RawEvent::new(EV_SYN, 0, 0)
}

fn encode(events: &[RawEvent]) -> Vec<u8> {
    events
        .iter()
        .flat_map(|e| e.encode(EventLayout::Wide))
        .collect()
}

fn touchscreen(events: &[RawEvent]) -> (Touchscreen<Cursor<Vec<u8>>>, Log) {
    let mut ts = Touchscreen::new(Cursor::new(encode(events)), EventLayout::Wide, 10);
    let log: Log = Arc::default();
    for event in [TouchEvent::Press, TouchEvent::Move, TouchEvent::Release] {
        let log = log.clone();
        ts.dispatcher_mut().on(event, move |e, t| {
            log.lock().unwrap().push(Fired {
                event: e,
                slot: t.slot(),
                x: t.x(),
                y: t.y(),
                last_x: t.last_x(),
                valid: t.valid(),
            })
        });
    }
    (ts, log)
}

fn take(log: &Log) -> Vec<Fired> {
    std::mem::take(&mut *log.lock().unwrap())
}

#[test]
fn press_move_release_lifecycle() {
    let (mut ts, log) = touchscreen(&[
        abs(ABS_MT_SLOT, 2),
        abs(ABS_MT_TRACKING_ID, 10),
        abs(ABS_MT_POSITION_X, 100),
        abs(ABS_MT_POSITION_Y, 200),
        syn(),
        abs(ABS_MT_SLOT, 2),
        abs(ABS_MT_POSITION_X, 150),
        syn(),
        abs(ABS_MT_SLOT, 2),
        abs(ABS_MT_TRACKING_ID, -1),
        syn(),
    ]);

    // Press frame. The contact also moved from (0, 0), so Move fires first.
    let touches = ts.poll_once().unwrap().unwrap();
    let slot2 = &touches[2];
    assert_eq!((slot2.id(), slot2.x(), slot2.y()), (10, 100, 200));
    assert!(slot2.valid());
    let fired = take(&log);
    let presses: Vec<&Fired> = fired.iter().filter(|f| f.event == TouchEvent::Press).collect();
    assert_eq!(presses.len(), 1);
    assert_eq!((presses[0].slot, presses[0].x, presses[0].y), (2, 100, 200));
    assert!(fired.iter().all(|f| f.slot == 2));
    assert!(fired.iter().all(|f| f.event != TouchEvent::Release));

    // Move frame.
    ts.poll_once().unwrap().unwrap();
    let fired = take(&log);
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].event, TouchEvent::Move);
    assert_eq!((fired[0].x, fired[0].last_x), (150, 100));

    // Release frame.
    let touches = ts.poll_once().unwrap().unwrap();
    assert!(!touches[2].valid());
    let fired = take(&log);
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].event, TouchEvent::Release);
    assert!(!fired[0].valid);
    assert_eq!(ts.valid_touches().count(), 0);

    assert!(matches!(ts.poll_once(), Err(Error::DeviceDisconnected)));
}

#[test]
fn many_writes_in_one_frame_fire_one_move() {
    let (mut ts, log) = touchscreen(&[
        abs(ABS_MT_TRACKING_ID, 1),
        syn(),
        abs(ABS_MT_POSITION_X, 1),
        abs(ABS_MT_POSITION_X, 2),
        abs(ABS_MT_POSITION_Y, 3),
        abs(ABS_MT_POSITION_X, 4),
        syn(),
    ]);
    ts.poll_once().unwrap();
    take(&log);

    ts.poll_once().unwrap();
    let fired = take(&log);
    assert_eq!(fired.len(), 1);
    assert_eq!((fired[0].event, fired[0].x, fired[0].y), (TouchEvent::Move, 4, 3));
}

#[test]
fn press_and_release_in_one_frame() {
    let (mut ts, log) = touchscreen(&[
        abs(ABS_MT_SLOT, 4),
        abs(ABS_MT_TRACKING_ID, 5),
        abs(ABS_MT_TRACKING_ID, -1),
        syn(),
    ]);
    let touches = ts.poll_once().unwrap().unwrap();
    assert!(!touches[4].valid());
    let events: Vec<TouchEvent> = take(&log).into_iter().map(|f| f.event).collect();
    assert_eq!(events, vec![TouchEvent::Press, TouchEvent::Release]);
}

#[test]
fn frame_spanning_several_slots() {
    let (mut ts, log) = touchscreen(&[
        abs(ABS_MT_SLOT, 0),
        abs(ABS_MT_TRACKING_ID, 1),
        abs(ABS_MT_SLOT, 1),
        abs(ABS_MT_TRACKING_ID, 2),
        abs(ABS_MT_SLOT, 1),
        abs(ABS_X, 7),
        abs(ABS_Y, 8),
        syn(),
    ]);
    ts.poll_once().unwrap();
    let mut slots: Vec<usize> = take(&log).into_iter().map(|f| f.slot).collect();
    slots.sort();
    assert_eq!(slots, vec![0, 1]);
    assert_eq!((ts.position().x(), ts.position().y()), (7, 8));
    assert_eq!(ts.valid_touches().count(), 2);
}

#[test]
fn truncated_record_leaves_state_unchanged() {
    let mut bytes = encode(&[abs(ABS_MT_TRACKING_ID, 3), syn()]);
    let mut tail = abs(ABS_MT_POSITION_X, 999).encode(EventLayout::Wide);
    tail.truncate(11);
    bytes.extend(tail);

    let mut ts = Touchscreen::new(Cursor::new(bytes), EventLayout::Wide, 10);
    ts.poll_once().unwrap();
    let before = ts.touches().to_vec();

    assert!(matches!(ts.poll_once(), Err(Error::Protocol(_))));
    assert_eq!(ts.touches(), &before[..]);
}

#[test]
fn slot_outside_registry_is_rejected() {
    let (mut ts, log) = touchscreen(&[abs(ABS_MT_SLOT, 10), syn()]);
    assert!(matches!(
        ts.poll_once(),
        Err(Error::IndexOutOfRange { slot: 10, slots: 10 })
    ));
    assert!(take(&log).is_empty());
}

#[test]
fn updates_after_rejected_slot_do_not_leak_into_previous_slot() {
    let (mut ts, log) = touchscreen(&[
        abs(ABS_MT_SLOT, 0),
        abs(ABS_MT_TRACKING_ID, 1),
        syn(),
        abs(ABS_MT_SLOT, 12),
        abs(ABS_MT_TRACKING_ID, 7),
        abs(ABS_MT_POSITION_X, 50),
        syn(),
    ]);
    ts.poll_once().unwrap();
    take(&log);

    assert!(matches!(
        ts.poll_once(),
        Err(Error::IndexOutOfRange { slot: 12, .. })
    ));
    // The rest of the frame is read after the error and must not land on slot 0.
    ts.poll_once().unwrap().unwrap();
    let slot0 = &ts.touches()[0];
    assert_eq!((slot0.id(), slot0.x()), (1, 0));
    assert!(take(&log).is_empty());
    assert_eq!(ts.valid_touches().count(), 1);
}

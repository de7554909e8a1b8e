//! Behavior of change-tracked refreshes against a recording sink.

use core::convert::Infallible;

use it8951::{AutoDisplay, FrameSink, Region, WaveformMode, BLACK, WHITE};

/// Records every load and refresh so tests can assert exactly what would
/// have reached the panel.
#[derive(Default)]
struct RecordingSink {
    loads: Vec<(Vec<u8>, Region)>,
    refreshes: Vec<(Region, WaveformMode)>,
}

impl FrameSink for RecordingSink {
    type Error = Infallible;

    fn load_area(
        &mut self,
        pixels: &[u8],
        x: u16,
        y: u16,
        width: u16,
        height: u16,
    ) -> Result<(), Self::Error> {
        self.loads.push((pixels.to_vec(), rect(x, y, width, height)));
        Ok(())
    }

    fn refresh_area(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        mode: WaveformMode,
    ) -> Result<(), Self::Error> {
        self.refreshes.push((rect(x, y, width, height), mode));
        Ok(())
    }
}

fn rect(x: u16, y: u16, width: u16, height: u16) -> Region {
    Region {
        min_x: x,
        min_y: y,
        max_x: x + width,
        max_y: y + height,
    }
}

/// Paint a square of pixels starting at (x, y).
fn paint(display: &mut AutoDisplay<RecordingSink>, x: u16, y: u16, side: u16, value: u8) {
    for dy in 0..side {
        for dx in 0..side {
            display.set_pixel(x + dx, y + dy, value);
        }
    }
}

#[test]
fn clear_sends_full_white_frame_with_init() {
    let mut display = AutoDisplay::new(RecordingSink::default(), 16, 16);
    display.clear().unwrap();

    let sink = display.sink();
    assert_eq!(sink.loads.len(), 1);
    let (pixels, region) = &sink.loads[0];
    assert_eq!(*region, rect(0, 0, 16, 16));
    assert!(pixels.iter().all(|&p| p == WHITE));
    assert_eq!(sink.refreshes, vec![(rect(0, 0, 16, 16), WaveformMode::Init)]);
}

#[test]
fn first_partial_refresh_degrades_to_full() {
    let mut display = AutoDisplay::new(RecordingSink::default(), 16, 16);
    display.set_pixel(3, 3, BLACK);
    display.partial_refresh(WaveformMode::Gc16).unwrap();

    // No committed frame existed, so the whole frame went out.
    let sink = display.sink();
    assert_eq!(sink.loads.len(), 1);
    assert_eq!(sink.loads[0].1, rect(0, 0, 16, 16));
    assert_eq!(sink.refreshes[0], (rect(0, 0, 16, 16), WaveformMode::Gc16));
}

#[test]
fn unchanged_partial_refresh_does_no_io() {
    let mut display = AutoDisplay::new(RecordingSink::default(), 16, 16);
    display.clear().unwrap();

    display.partial_refresh(WaveformMode::Gc16).unwrap();
    display.partial_refresh(WaveformMode::Du).unwrap();

    // Only the clear touched the sink.
    assert_eq!(display.sink().loads.len(), 1);
    assert_eq!(display.sink().refreshes.len(), 1);
}

#[test]
fn reverted_edit_leaves_nothing_to_send() {
    let mut display = AutoDisplay::new(RecordingSink::default(), 16, 16);
    display.clear().unwrap();

    display.set_pixel(5, 5, BLACK);
    display.set_pixel(5, 5, WHITE);
    display.partial_refresh(WaveformMode::Gc16).unwrap();

    assert_eq!(display.sink().loads.len(), 1);
}

#[test]
fn full_refresh_resends_even_when_unchanged() {
    let mut display = AutoDisplay::new(RecordingSink::default(), 16, 16);
    display.clear().unwrap();
    display.full_refresh(WaveformMode::Gc16).unwrap();

    assert_eq!(display.sink().loads.len(), 2);
    assert_eq!(display.sink().loads[1].1, rect(0, 0, 16, 16));
}

#[test]
fn fast_partial_rounds_to_eight_and_sends_only_binary_values() {
    let mut display = AutoDisplay::new(RecordingSink::default(), 16, 16);
    display.clear().unwrap();

    paint(&mut display, 0, 0, 4, BLACK);
    display.partial_refresh(WaveformMode::Du).unwrap();

    let sink = display.sink();
    assert_eq!(sink.loads.len(), 2);
    let (pixels, region) = &sink.loads[1];
    assert_eq!(*region, rect(0, 0, 8, 8));
    assert_eq!(pixels.len(), 64);
    assert!(pixels.iter().all(|&p| p == BLACK || p == WHITE));

    // The changed 4x4 corner is black, the alignment padding stays white.
    for y in 0..8u16 {
        for x in 0..8u16 {
            let expected = if x < 4 && y < 4 { BLACK } else { WHITE };
            assert_eq!(pixels[usize::from(y) * 8 + usize::from(x)], expected);
        }
    }

    assert_eq!(sink.refreshes[1], (rect(0, 0, 8, 8), WaveformMode::Du));
}

#[test]
fn fast_partial_quantizes_only_pixels_that_differ() {
    let mut display = AutoDisplay::new(RecordingSink::default(), 16, 16);
    // Commit a mid-gray background first.
    display.fill(0x60);
    display.full_refresh(WaveformMode::Gc16).unwrap();

    // One dark and one light edit inside the same aligned block.
    display.set_pixel(0, 0, 0x20);
    display.set_pixel(1, 0, 0xC0);
    display.partial_refresh(WaveformMode::Du).unwrap();

    let (pixels, region) = &display.sink().loads[1];
    assert_eq!(*region, rect(0, 0, 8, 8));
    // Changed pixels snap to an extreme, by midpoint threshold.
    assert_eq!(pixels[0], BLACK);
    assert_eq!(pixels[1], WHITE);
    // Unchanged neighbors keep their committed gray value.
    assert_eq!(pixels[2], 0x60);
}

#[test]
fn gray_tracking_accumulates_fast_changes_until_gray_refresh() {
    let mut display = AutoDisplay::with_gray_tracking(RecordingSink::default(), 32, 32, true);
    display.clear().unwrap();

    // Two fast refreshes over disjoint regions.
    paint(&mut display, 0, 0, 4, BLACK);
    display.partial_refresh(WaveformMode::Du).unwrap();
    paint(&mut display, 8, 8, 4, 0x40);
    display.partial_refresh(WaveformMode::Du).unwrap();

    assert_eq!(display.sink().loads[1].1, rect(0, 0, 8, 8));
    assert_eq!(display.sink().loads[2].1, rect(8, 8, 8, 8));

    // The next gray-capable refresh retransmits the union of the rounded
    // boxes even though nothing changed since.
    display.partial_refresh(WaveformMode::Gl16).unwrap();
    let (pixels, region) = &display.sink().loads[3];
    assert_eq!(*region, rect(0, 0, 16, 16));
    // True gray levels go out, not the binary intermediates.
    assert_eq!(pixels[8 * 16 + 8], 0x40);
    assert_eq!(
        display.sink().refreshes[3],
        (rect(0, 0, 16, 16), WaveformMode::Gl16)
    );

    // The accumulator is spent: another gray partial has nothing to send.
    display.partial_refresh(WaveformMode::Gl16).unwrap();
    assert_eq!(display.sink().loads.len(), 4);
}

#[test]
fn gray_tracking_folds_fast_full_refresh_diffs() {
    let mut display = AutoDisplay::with_gray_tracking(RecordingSink::default(), 32, 32, true);
    display.clear().unwrap();

    paint(&mut display, 4, 4, 4, 0x30);
    display.full_refresh(WaveformMode::Du).unwrap();

    // The fast full refresh left binary intermediates; the next gray
    // partial must cover the folded diff even with no new edits.
    display.partial_refresh(WaveformMode::Gc16).unwrap();
    let region = display.sink().loads[2].1;
    assert_eq!(region, rect(0, 0, 8, 8));
}

#[test]
fn without_gray_tracking_fast_changes_are_forgotten() {
    let mut display = AutoDisplay::new(RecordingSink::default(), 32, 32);
    display.clear().unwrap();

    paint(&mut display, 0, 0, 4, BLACK);
    display.partial_refresh(WaveformMode::Du).unwrap();

    // Nothing accumulated: a gray partial with no new edits is a no-op.
    display.partial_refresh(WaveformMode::Gc16).unwrap();
    assert_eq!(display.sink().loads.len(), 2);
}

#[test]
fn partial_refresh_clamps_rounding_to_unaligned_panel_edge() {
    // 6 is not a multiple of either alignment, so rounding near the bottom
    // edge overshoots the frame.
    let mut display = AutoDisplay::new(RecordingSink::default(), 16, 6);
    display.clear().unwrap();

    display.set_pixel(0, 5, BLACK);
    display.partial_refresh(WaveformMode::Gc16).unwrap();

    let (pixels, region) = &display.sink().loads[1];
    assert_eq!(*region, rect(0, 4, 4, 2));
    assert_eq!(pixels.len(), 8);

    display.set_pixel(15, 5, BLACK);
    display.partial_refresh(WaveformMode::Du).unwrap();

    let (pixels, region) = &display.sink().loads[2];
    assert_eq!(*region, rect(8, 0, 8, 6));
    assert_eq!(pixels.len(), 48);
}

#[test]
fn gray_partial_rounds_to_four() {
    let mut display = AutoDisplay::new(RecordingSink::default(), 16, 16);
    display.clear().unwrap();

    display.set_pixel(5, 5, 0x80);
    display.partial_refresh(WaveformMode::Gc16).unwrap();

    assert_eq!(display.sink().loads[1].1, rect(4, 4, 4, 4));
}

//! Unit tests for tiling geometry
//!
//! Covers rectangle planning, gap insets and step cycling through the public
//! API: fixed scenarios first, then properties checked over a grid of inputs.

use snaptile::{
    compute_rect,
    config::TilingConfig,
    models::{Direction, GapInsets, Orientation, Rect, TilingStep, TilingSteps, WorkArea},
    GestureSequencer,
};
use std::time::Duration;
use tokio::time::Instant;

const FULL_HD: Rect = Rect::new(0, 0, 1920, 1080);

const EDGE_DIRECTIONS: [Direction; 9] = [
    Direction::FILL,
    Direction::LEFT,
    Direction::RIGHT,
    Direction::TOP,
    Direction::BOTTOM,
    Direction::TOP_LEFT,
    Direction::TOP_RIGHT,
    Direction::BOTTOM_LEFT,
    Direction::BOTTOM_RIGHT,
];

fn config(side: &str, inner_gaps: bool) -> TilingConfig {
    TilingConfig {
        side_steps: side.parse().unwrap(),
        inner_gaps,
        ..TilingConfig::default()
    }
}

fn steps_under_test() -> Vec<TilingStep> {
    vec![
        TilingStep::uniform(0.5),
        TilingStep::uniform(0.333),
        TilingStep::uniform(0.667),
        TilingStep::new(0.25, 0.75),
        TilingStep::uniform(0.0),
        TilingStep::uniform(1.0),
    ]
}

fn areas_under_test() -> Vec<WorkArea> {
    vec![
        WorkArea::ungapped(FULL_HD),
        WorkArea::new(FULL_HD, FULL_HD, 10),
        WorkArea::new(Rect::new(0, 27, 1920, 1053), FULL_HD, 4),
        WorkArea::new(Rect::new(1920, 0, 1080, 1920), Rect::new(1920, 0, 1080, 1920), 10),
    ]
}

#[test]
fn scenario_left_half_without_gaps() {
    let area = WorkArea::ungapped(FULL_HD);
    let rect = compute_rect(&area, Direction::LEFT, TilingStep::uniform(0.5), false, true);
    assert_eq!(rect, Rect::new(0, 0, 960, 1080));
}

#[test]
fn scenario_center_mode_shrinks_by_step() {
    let area = WorkArea::ungapped(FULL_HD);
    let rect = compute_rect(&area, Direction::FILL, TilingStep::new(0.2, 0.2), true, true);
    assert_eq!(rect, Rect::new(192, 108, 1536, 864));
}

#[test]
fn scenario_ten_percent_gap() {
    let area = WorkArea::new(FULL_HD, FULL_HD, 10);
    assert_eq!(area.gaps, Some(GapInsets { x: 96, y: 54 }));
    assert_eq!(area.rect, Rect::new(96, 54, 1728, 972));
}

#[test]
fn scenario_three_presses_cycle_side_steps() {
    let mut sequencer = GestureSequencer::new();
    let config = config("0.5, 0.33, 0.67", false);
    let area = WorkArea::ungapped(FULL_HD);
    let start = Instant::now();

    let mut widths = Vec::new();
    let mut indices = Vec::new();
    for press in 0..4u64 {
        let now = start + Duration::from_millis(300 * press);
        widths.push(sequencer.next_rect(7, Direction::LEFT, &area, &config, now).width);
        indices.push(sequencer.previous().unwrap().step_index - 1);
    }

    assert_eq!(indices, vec![0, 1, 2, 0]);
    assert_eq!(widths, vec![960, 634, 1286, 960]);
}

#[test]
fn gap_is_capped_at_twice_the_other_axis() {
    // Very wide and short work area
    let area = WorkArea::new(Rect::new(0, 0, 4000, 200), Rect::new(0, 0, 4000, 200), 20);
    let gaps = area.gaps.unwrap();
    assert_eq!(gaps.y, 20);
    assert_eq!(gaps.x, 40);
}

#[test]
fn zero_gap_has_no_insets() {
    let area = WorkArea::new(FULL_HD, FULL_HD, 0);
    assert_eq!(area.gaps, None);
    assert_eq!(area.rect, FULL_HD);
}

#[test]
fn planning_is_deterministic() {
    for area in areas_under_test() {
        for direction in EDGE_DIRECTIONS {
            for step in steps_under_test() {
                let first = compute_rect(&area, direction, step, false, true);
                let second = compute_rect(&area, direction, step, false, true);
                assert_eq!(first, second);
            }
        }
    }
}

#[test]
fn planned_rects_stay_inside_gapped_area() {
    for area in areas_under_test() {
        for step in steps_under_test() {
            for inner_gaps in [false, true] {
                for direction in EDGE_DIRECTIONS {
                    let rect = compute_rect(&area, direction, step, false, inner_gaps);
                    assert!(
                        area.rect.contains_rect(&rect),
                        "{} with step {} escaped {}: {}",
                        direction,
                        step,
                        area.rect,
                        rect
                    );
                }

                let centered = compute_rect(&area, Direction::CENTER, step, true, inner_gaps);
                assert!(area.rect.contains_rect(&centered));
            }
        }
    }
}

#[test]
fn left_and_right_mirror_each_other() {
    let area = WorkArea::new(FULL_HD, FULL_HD, 10);

    for fraction in [0.5, 0.333, 0.667, 0.25] {
        let step = TilingStep::uniform(fraction);
        for inner_gaps in [false, true] {
            let left = compute_rect(&area, Direction::LEFT, step, false, inner_gaps);
            let right = compute_rect(&area, Direction::RIGHT, step, false, inner_gaps);

            assert_eq!(left.width, right.width, "width differs at {}", fraction);
            assert_eq!(left.x - area.rect.x, area.rect.right() - right.right());
            assert_eq!((left.y, left.height), (right.y, right.height));
        }
    }
}

#[test]
fn halves_leave_exactly_one_gap_between_them() {
    let area = WorkArea::new(FULL_HD, FULL_HD, 10);
    let step = TilingStep::uniform(0.5);

    let left = compute_rect(&area, Direction::LEFT, step, false, true);
    let right = compute_rect(&area, Direction::RIGHT, step, false, true);
    assert_eq!(right.x - left.right(), area.gaps.unwrap().x);

    let top = compute_rect(&area, Direction::TOP, step, false, true);
    let bottom = compute_rect(&area, Direction::BOTTOM, step, false, true);
    assert_eq!(bottom.y - top.bottom(), area.gaps.unwrap().y);
}

#[test]
fn no_op_skip_terminates_for_identical_steps() {
    let mut sequencer = GestureSequencer::new();
    let config = config("0.5, 0.5, 0.5", false);
    let area = WorkArea::ungapped(FULL_HD);
    let now = Instant::now();

    for _ in 0..10 {
        let rect = sequencer.next_rect(1, Direction::RIGHT, &area, &config, now);
        assert_eq!(rect, Rect::new(960, 0, 960, 1080));
    }
}

#[test]
fn chaining_requires_same_window_direction_and_timeout() {
    let config = config("0.5, 0.25", false);
    let area = WorkArea::ungapped(FULL_HD);
    let start = Instant::now();

    let mut sequencer = GestureSequencer::new();
    sequencer.next_rect(1, Direction::LEFT, &area, &config, start);
    let at_timeout = start + config.gesture_timeout;
    let chained = sequencer.next_rect(1, Direction::LEFT, &area, &config, at_timeout);
    assert_eq!(chained.width, 480);

    let mut sequencer = GestureSequencer::new();
    sequencer.next_rect(1, Direction::LEFT, &area, &config, start);
    let late = start + config.gesture_timeout + Duration::from_millis(1);
    assert_eq!(sequencer.next_rect(1, Direction::LEFT, &area, &config, late).width, 960);

    let mut sequencer = GestureSequencer::new();
    sequencer.next_rect(1, Direction::LEFT, &area, &config, start);
    sequencer.next_rect(1, Direction::TOP_LEFT, &area, &config, start);
    assert_eq!(sequencer.previous().unwrap().step_index, 1);
}

#[test]
fn portrait_monitor_swaps_gaps_and_center_axes() {
    let landscape = WorkArea::new(FULL_HD, FULL_HD, 10);
    let portrait_screen = Rect::new(0, 0, 1080, 1920);
    let portrait = WorkArea::new(portrait_screen, portrait_screen, 10);

    assert_eq!(portrait.orientation, Orientation::Portrait);
    assert_eq!(portrait.gaps, landscape.gaps);
    assert_eq!(portrait.rect, Rect::new(96, 54, 888, 1812));

    let step = TilingStep::new(0.25, 0.15);
    let wide = compute_rect(&WorkArea::ungapped(FULL_HD), Direction::CENTER, step, true, false);
    let portrait_area = WorkArea::ungapped(portrait_screen);
    let tall = compute_rect(&portrait_area, Direction::CENTER, step, true, false);
    assert_eq!((wide.width, wide.height), (1440, 918));
    assert_eq!((tall.width, tall.height), (918, 1440));
}

#[test]
fn malformed_steps_fall_back_to_defaults() {
    let steps = TilingSteps::parse_or("0.5;;0.3", "0.5, 0.333, 0.667");
    assert_eq!(steps, TilingSteps::default_side());
}

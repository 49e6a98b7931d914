//! Fixed-height list virtualization.
//!
//! All items are treated as uniform height, so the visible slice and the
//! scroll geometry are pure arithmetic over the scroll offset. Cheap enough
//! to run synchronously on every scroll event.

use crate::state::VisibleRange;

/// Which slice of the list intersects the viewport.
///
/// `buffer` extra rows are included on each side so fast scrolling does not
/// outrun rendering. `end` is not clamped to the list length; callers slice
/// with [`clamp`].
pub fn compute_window(
    viewport_height: u32,
    scroll_top: u32,
    item_height: u32,
    buffer: usize,
) -> VisibleRange {
    let item_height = item_height.max(1);
    let visible_count =
        (viewport_height.div_ceil(item_height)) as usize + buffer;
    let start =
        ((scroll_top / item_height) as usize).saturating_sub(buffer);
    VisibleRange {
        start,
        end: start + visible_count,
    }
}

/// Bound a window to a list of `len` items.
pub fn clamp(range: VisibleRange, len: usize) -> VisibleRange {
    let start = range.start.min(len);
    VisibleRange {
        start,
        end: range.end.clamp(start, len),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_math_matches_the_card_layout() {
        // 600px viewport over 280px cards with a 2 row buffer, scrolled
        // two cards down.
        let range = compute_window(600, 560, 280, 2);
        assert_eq!(range, VisibleRange { start: 0, end: 5 });
    }

    #[test]
    fn scrolling_past_the_buffer_moves_the_start() {
        let range = compute_window(600, 2800, 280, 2);
        assert_eq!(range.start, 8);
        assert_eq!(range.end, 13);
    }

    #[test]
    fn top_of_list_never_goes_negative() {
        let range = compute_window(600, 0, 280, 2);
        assert_eq!(range.start, 0);
    }

    #[test]
    fn zero_height_items_do_not_divide_by_zero() {
        let range = compute_window(600, 100, 0, 2);
        assert_eq!(range.start, 98);
    }

    #[test]
    fn clamp_respects_short_lists() {
        let range = VisibleRange { start: 0, end: 10 };
        assert_eq!(clamp(range, 3), VisibleRange { start: 0, end: 3 });

        let range = VisibleRange { start: 8, end: 13 };
        assert_eq!(clamp(range, 5), VisibleRange { start: 5, end: 5 });
        assert_eq!(clamp(range, 0), VisibleRange { start: 0, end: 0 });
    }
}

//! Row offsets within the flattened (hour × category) feed stream.

use chrono::NaiveDate;

use crate::category::{self, Category};

/// Rows per feed page.
pub const ROWS_PER_PAGE: usize = 10;

/// Date and hour of the first row the feed returned for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastAnchor {
    pub first_date: NaiveDate,
    pub first_hour: u32,
}

impl ForecastAnchor {
    pub fn new(first_date: NaiveDate, first_hour: u32) -> Self {
        Self {
            first_date,
            first_hour,
        }
    }

    /// Whether (date, hour) lies strictly before the first row.
    pub fn starts_after(&self, date: NaiveDate, hour: u32) -> bool {
        (date, hour) < (self.first_date, self.first_hour)
    }
}

/// Zero-based row of (category, date, hour) counted from the anchor.
///
/// Walks hour by hour from the anchor, adding each visited hour's block
/// width, so the two wider blocks are accounted for exactly.
pub fn index_of(
    anchor: &ForecastAnchor,
    category: Category,
    date: NaiveDate,
    hour: u32,
) -> Option<usize> {
    if hour > 23 || anchor.first_hour > 23 || anchor.starts_after(date, hour) {
        return None;
    }
    let position = category::position_in(hour, category)?;

    let mut cursor = (anchor.first_date, anchor.first_hour);
    let mut offset = 0;
    while cursor < (date, hour) {
        offset += category::block_width(cursor.1);
        cursor = if cursor.1 == 23 {
            (cursor.0.succ_opt()?, 0)
        } else {
            (cursor.0, cursor.1 + 1)
        };
    }

    Some(offset + position)
}

/// 1-based page holding row `index`.
pub fn page_for_index(index: usize) -> u32 {
    (index / ROWS_PER_PAGE) as u32 + 1
}

/// Pages searched for row `index`: its own page, then both neighbours.
///
/// Page edges do not line up with hour blocks, so a row may sit one page
/// off from where the offset puts it.
pub fn candidate_pages(index: usize) -> Vec<u32> {
    let primary = page_for_index(index);
    let mut pages = vec![primary, primary + 1];
    if primary > 1 {
        pages.push(primary - 1);
    }
    pages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::BASE_SEQUENCE;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn first_category_at_anchor_is_zero() {
        for hour in 0..24 {
            let anchor = ForecastAnchor::new(date(2024, 1, 1), hour);
            let first = category::sequence_for(hour)[0];
            assert_eq!(index_of(&anchor, first, date(2024, 1, 1), hour), Some(0));
        }
    }

    #[test]
    fn step_equals_width_of_earlier_hour() {
        let anchor = ForecastAnchor::new(date(2024, 1, 1), 2);
        let mut previous = index_of(&anchor, Category::Reh, date(2024, 1, 1), 2).unwrap();
        let (mut d, mut h) = (date(2024, 1, 1), 2);
        for _ in 0..48 {
            let width = category::block_width(h);
            if h == 23 {
                d = d.succ_opt().unwrap();
                h = 0;
            } else {
                h += 1;
            }
            let current = index_of(&anchor, Category::Reh, d, h).unwrap();
            assert_eq!(current - previous, width);
            previous = current;
        }
    }

    #[test]
    fn before_anchor_is_unmapped() {
        let anchor = ForecastAnchor::new(date(2024, 1, 1), 5);
        assert_eq!(index_of(&anchor, Category::Tmp, date(2024, 1, 1), 4), None);
        assert_eq!(index_of(&anchor, Category::Tmp, date(2023, 12, 31), 23), None);
    }

    #[test]
    fn category_missing_from_hour_is_unmapped() {
        let anchor = ForecastAnchor::new(date(2024, 1, 1), 2);
        assert_eq!(index_of(&anchor, Category::Tmn, date(2024, 1, 1), 7), None);
        assert_eq!(index_of(&anchor, Category::Tmx, date(2024, 1, 1), 6), None);
        assert_eq!(index_of(&anchor, Category::Tmp, date(2024, 1, 1), 24), None);
    }

    #[test]
    fn tmp_three_hours_after_anchor() {
        let anchor = ForecastAnchor::new(date(2024, 1, 1), 2);
        assert_eq!(BASE_SEQUENCE[0], Category::Tmp);
        assert_eq!(index_of(&anchor, Category::Tmp, date(2024, 1, 1), 5), Some(36));
    }

    #[test]
    fn wide_blocks_shift_later_offsets() {
        let anchor = ForecastAnchor::new(date(2024, 1, 1), 5);
        // 05 (12) + 06 (13)
        assert_eq!(index_of(&anchor, Category::Tmp, date(2024, 1, 1), 7), Some(25));
        assert_eq!(index_of(&anchor, Category::Tmn, date(2024, 1, 1), 6), Some(24));
    }

    #[test]
    fn cursor_wraps_across_midnight() {
        let anchor = ForecastAnchor::new(date(2024, 1, 31), 22);
        assert_eq!(index_of(&anchor, Category::Uuu, date(2024, 2, 1), 0), Some(25));
    }

    #[test]
    fn full_day_offset_matches_closed_form() {
        let anchor = ForecastAnchor::new(date(2024, 1, 1), 0);
        // 24 blocks of 12 plus the two extra rows
        assert_eq!(
            index_of(&anchor, Category::Tmp, date(2024, 1, 2), 0),
            Some(24 * 12 + 2)
        );
    }

    #[test]
    fn page_numbers() {
        assert_eq!(page_for_index(0), 1);
        assert_eq!(page_for_index(9), 1);
        assert_eq!(page_for_index(10), 2);
        assert_eq!(page_for_index(19), 2);
        assert_eq!(page_for_index(36), 4);
    }

    #[test]
    fn candidates_skip_page_zero() {
        assert_eq!(candidate_pages(3), vec![1, 2]);
        assert_eq!(candidate_pages(36), vec![4, 5, 3]);
    }
}

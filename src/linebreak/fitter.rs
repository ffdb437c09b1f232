//! Greedy line fitting over breakable elements.
//!
//! Elements accumulate onto the current line until one would overflow the
//! budget; the line then ends at the best break opportunity seen so far, where
//! best means lowest combined penalty with ties going to the latest candidate.
//! Groups are fitted as one unit, and an element too wide for the budget gets a
//! line of its own rather than being clipped.

use crate::dimensions::units::Px;
use crate::dimensions::Unit;

use super::tokenizer::{BreakableElement, PENALTY_NEVER};

/// One line of output: a half-open index range into the element slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub range: std::ops::Range<usize>,
}

/// Assigns elements to lines within `max_width`. A zero budget means no
/// breaking at all.
pub fn fit<'f, F>(elements: &[BreakableElement<'f, F>], max_width: Unit<Px>) -> Vec<Line> {
    if elements.is_empty() {
        return Vec::new();
    }
    if max_width.is_zero() {
        return vec![Line {
            range: 0..elements.len(),
        }];
    }

    let mut lines = Vec::new();
    let mut start = 0;
    let mut width = Unit::ZERO;
    // Best break seen on the current line: (index the line would end before,
    // combined penalty).
    let mut best_break: Option<(usize, i32)> = None;

    let mut index = 0;
    while index < elements.len() {
        let unit_end = group_end(elements, index);
        let unit_width: Unit<Px> = elements[index..unit_end]
            .iter()
            .map(|element| element.width)
            .fold(Unit::ZERO, |acc, w| acc + w);

        // The first unit of a line always goes on it, even oversized.
        if index == start || width + unit_width <= max_width {
            if index > start {
                if let Some(penalty) = break_penalty(elements, index) {
                    let better = match best_break {
                        None => true,
                        Some((_, best)) => penalty <= best,
                    };
                    if better {
                        best_break = Some((index, penalty));
                    }
                }
            }
            width += unit_width;
            index = unit_end;
        } else {
            // Overflow: ending the line right before this unit is itself a
            // candidate, competing with the ones recorded earlier.
            let mut choice = best_break;
            if let Some(penalty) = break_penalty(elements, index) {
                let better = match choice {
                    None => true,
                    Some((_, best)) => penalty <= best,
                };
                if better {
                    choice = Some((index, penalty));
                }
            }
            let break_at = match choice {
                Some((at, _)) => at,
                None => index,
            };
            lines.push(Line {
                range: start..break_at,
            });
            start = break_at;
            best_break = None;
            width = elements[start..index]
                .iter()
                .map(|element| element.width)
                .fold(Unit::ZERO, |acc, w| acc + w);
        }
    }

    lines.push(Line {
        range: start..elements.len(),
    });
    lines
}

/// End of the group unit starting at `index`, exclusive.
fn group_end<'f, F>(elements: &[BreakableElement<'f, F>], index: usize) -> usize {
    match elements[index].group {
        None => index + 1,
        Some(group) => {
            let mut end = index + 1;
            while end < elements.len() && elements[end].group == Some(group) {
                end += 1;
            }
            end
        }
    }
}

/// Combined penalty of breaking before `index`, or `None` if forbidden.
fn break_penalty<'f, F>(elements: &[BreakableElement<'f, F>], index: usize) -> Option<i32> {
    let left = &elements[index - 1];
    let right = &elements[index];

    if !left.may_break_after || !right.may_break_before {
        return None;
    }
    if left.penalty_after == PENALTY_NEVER || right.penalty_before == PENALTY_NEVER {
        return None;
    }
    if left.group.is_some() && left.group == right.group {
        return None;
    }

    Some(left.penalty_after.saturating_add(right.penalty_before))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linebreak::tokenizer::{
        BreakableElement, ElementContent, PENALTY_INTRA_WORD, PENALTY_OPERATOR, PENALTY_RUN,
    };

    pub enum NoFont {}

    fn boxed(width: f64) -> BreakableElement<'static, NoFont> {
        BreakableElement {
            content: ElementContent::Space,
            width: Unit::new(width),
            ascent: Unit::new(8.0),
            descent: Unit::new(2.0),
            may_break_before: true,
            may_break_after: true,
            penalty_before: PENALTY_RUN,
            penalty_after: PENALTY_RUN,
            group: None,
            indivisible: false,
            source: None,
        }
    }

    fn ranges(lines: &[Line]) -> Vec<std::ops::Range<usize>> {
        lines.iter().map(|line| line.range.clone()).collect()
    }

    #[test]
    fn zero_budget_means_one_line() {
        let elements = vec![boxed(50.0), boxed(50.0), boxed(50.0)];
        let lines = fit(&elements, Unit::ZERO);
        assert_eq!(ranges(&lines), vec![0..3]);
    }

    #[test]
    fn overflow_breaks_at_the_boundary() {
        let elements = vec![boxed(40.0), boxed(40.0), boxed(40.0)];
        let lines = fit(&elements, Unit::new(100.0));
        assert_eq!(ranges(&lines), vec![0..2, 2..3]);
    }

    #[test]
    fn lower_penalty_break_wins_over_later_position() {
        let mut elements = vec![boxed(30.0), boxed(30.0), boxed(30.0), boxed(30.0)];
        elements[1].penalty_before = PENALTY_OPERATOR;
        elements[1].penalty_after = PENALTY_OPERATOR;
        elements[2].penalty_before = PENALTY_INTRA_WORD;
        // Both 0..1|1.. and 0..2|2.. fit the first line; the operator boundary
        // before element 1 is cheaper than the mid-word one before element 2.
        let lines = fit(&elements, Unit::new(70.0));
        assert_eq!(lines[0].range, 0..1);
    }

    #[test]
    fn equal_penalties_prefer_the_latest_break() {
        let elements = vec![boxed(30.0), boxed(30.0), boxed(30.0), boxed(30.0)];
        let lines = fit(&elements, Unit::new(70.0));
        assert_eq!(ranges(&lines), vec![0..2, 2..4]);
    }

    #[test]
    fn groups_are_never_split() {
        let mut elements = vec![boxed(40.0), boxed(40.0), boxed(40.0)];
        elements[1].group = Some(0);
        elements[2].group = Some(0);
        elements[1].may_break_after = false;
        elements[2].may_break_before = false;
        let lines = fit(&elements, Unit::new(100.0));
        // The 80-wide group does not fit after the first element.
        assert_eq!(ranges(&lines), vec![0..1, 1..3]);
    }

    #[test]
    fn oversized_element_gets_its_own_line() {
        let elements = vec![boxed(30.0), boxed(500.0), boxed(30.0)];
        let lines = fit(&elements, Unit::new(100.0));
        assert_eq!(ranges(&lines), vec![0..1, 1..2, 2..3]);
    }

    #[test]
    fn forbidden_boundary_is_skipped() {
        let mut elements = vec![boxed(40.0), boxed(40.0), boxed(40.0)];
        elements[0].may_break_after = false;
        elements[1].may_break_before = false;
        let lines = fit(&elements, Unit::new(100.0));
        // No legal break inside 0..2, so the line is forced to end before 2.
        assert_eq!(ranges(&lines), vec![0..2, 2..3]);
    }
}

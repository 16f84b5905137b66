//! Deterministic ordering and numbering of family members.
//!
//! Members are ordered by level, then date of birth (oldest first, unknown
//! dates last), then name. That single order drives both the per-level
//! number and the overall number.

use std::cmp::Ordering;

use crate::hierarchy::LevelAssignment;
use crate::types::{FamilyTable, PersonRecord};

/// A record together with the values computed for it
#[derive(Debug, Clone)]
pub struct RankedMember<'a> {
    pub record: &'a PersonRecord,
    pub level: u32,
    /// 1-based position within its level
    pub level_number: usize,
    /// 1-based position across the whole family
    pub overall_number: usize,
}

/// All members in display order
#[derive(Debug, Clone)]
pub struct Ranking<'a> {
    members: Vec<RankedMember<'a>>,
}

impl<'a> Ranking<'a> {
    pub fn members(&self) -> &[RankedMember<'a>] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Member counts per level, in level order
    pub fn level_counts(&self) -> Vec<(u32, usize)> {
        let mut counts: Vec<(u32, usize)> = Vec::new();
        for member in &self.members {
            match counts.last_mut() {
                Some((level, count)) if *level == member.level => *count += 1,
                _ => counts.push((member.level, 1)),
            }
        }
        counts
    }
}

fn compare_birth(a: &PersonRecord, b: &PersonRecord) -> Ordering {
    match (a.date_of_birth, b.date_of_birth) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sorts the table's records by (level, date of birth, name) and numbers them.
pub fn rank<'a>(table: &'a FamilyTable, levels: &LevelAssignment) -> Ranking<'a> {
    let mut order: Vec<usize> = (0..table.len()).collect();
    order.sort_by(|&a, &b| {
        let (ra, rb) = (&table.records[a], &table.records[b]);
        levels
            .level_of(a)
            .cmp(&levels.level_of(b))
            .then_with(|| compare_birth(ra, rb))
            .then_with(|| ra.name.cmp(&rb.name))
    });

    let mut members = Vec::with_capacity(order.len());
    let mut current_level = None;
    let mut level_number = 0;

    for (position, index) in order.into_iter().enumerate() {
        let record = &table.records[index];
        let level = levels.level_of(index);
        if current_level != Some(level) {
            current_level = Some(level);
            level_number = 0;
        }
        level_number += 1;

        members.push(RankedMember {
            record,
            level,
            level_number,
            overall_number: position + 1,
        });
    }

    Ranking { members }
}

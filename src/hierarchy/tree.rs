use metrics::counter;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::{debug, warn};

use super::LevelAssignment;
use crate::error::{FamilyTreeError, Result};
use crate::types::{FamilyTable, PersonRecord};

/// What to do with a record whose Parent names nobody in the table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DanglingParentPolicy {
    /// Fail the run and list every unknown parent reference
    #[default]
    Error,
    /// Warn and place the record at level 0 without an edge
    Root,
}

/// Levels derived from parent links
#[derive(Debug, Clone)]
pub struct TreeResolution {
    pub levels: LevelAssignment,
    /// Names of records promoted to roots because their parent is unknown
    pub promoted_roots: Vec<String>,
    pub warnings: Vec<String>,
}

/// Assigns every record its depth in the parent forest: roots are level 0 and
/// each child sits one level below its parent.
///
/// Children are found through an adjacency map built once, and the forest is
/// walked breadth-first with a visited guard. Records unreachable from any root
/// can only hang off a parent cycle, which is reported as an error.
pub fn resolve_tree(table: &FamilyTable, policy: DanglingParentPolicy) -> Result<TreeResolution> {
    let records = &table.records;
    let index: HashMap<&str, usize> = records
        .iter()
        .enumerate()
        .map(|(i, record)| (record.name.as_str(), i))
        .collect();

    let mut children: HashMap<&str, Vec<usize>> = HashMap::new();
    let mut roots = Vec::new();
    let mut dangling = Vec::new();

    for (i, record) in records.iter().enumerate() {
        match record.parent.as_deref() {
            None => roots.push(i),
            Some(parent) if index.contains_key(parent) => {
                children.entry(parent).or_default().push(i);
            }
            Some(_) => dangling.push(i),
        }
    }

    let mut promoted_roots = Vec::new();
    let mut warnings = Vec::new();

    if !dangling.is_empty() {
        counter!("family_dangling_parents_total").increment(dangling.len() as u64);
        match policy {
            DanglingParentPolicy::Error => {
                let pairs = dangling
                    .iter()
                    .map(|&i| {
                        let record = &records[i];
                        (record.name.clone(), record.parent.clone().unwrap_or_default())
                    })
                    .collect();
                return Err(FamilyTreeError::DanglingParent(pairs));
            }
            DanglingParentPolicy::Root => {
                for &i in &dangling {
                    let record = &records[i];
                    let message = format!(
                        "Row {}: parent '{}' of {} does not exist; treating {} as a root",
                        record.row,
                        record.parent.as_deref().unwrap_or_default(),
                        record.name,
                        record.name
                    );
                    warn!("{}", message);
                    warnings.push(message);
                    promoted_roots.push(record.name.clone());
                }
                roots.extend(dangling);
                roots.sort_unstable();
            }
        }
    }

    let mut levels: Vec<Option<u32>> = vec![None; records.len()];
    let mut queue: VecDeque<(usize, u32)> = roots.iter().map(|&i| (i, 0)).collect();

    while let Some((i, level)) = queue.pop_front() {
        if levels[i].is_some() {
            continue;
        }
        levels[i] = Some(level);
        if let Some(kids) = children.get(records[i].name.as_str()) {
            for &child in kids {
                if levels[child].is_none() {
                    queue.push_back((child, level + 1));
                }
            }
        }
    }

    if let Some(start) = levels.iter().position(Option::is_none) {
        return Err(FamilyTreeError::Cycle(find_cycle(records, &index, start)));
    }

    let levels: Vec<u32> = levels.into_iter().flatten().collect();
    debug!(
        "Resolved {} records across {} levels",
        levels.len(),
        levels.iter().max().map(|m| m + 1).unwrap_or(0)
    );

    Ok(TreeResolution {
        levels: LevelAssignment::new(levels),
        promoted_roots,
        warnings,
    })
}

/// Follows parent links from `start` until a name repeats and returns the loop,
/// closed with its first name.
fn find_cycle(records: &[PersonRecord], index: &HashMap<&str, usize>, start: usize) -> Vec<String> {
    let mut path = Vec::new();
    let mut seen = HashSet::new();
    let mut current = start;

    while seen.insert(current) {
        path.push(current);
        match records[current]
            .parent
            .as_deref()
            .and_then(|parent| index.get(parent))
        {
            Some(&next) => current = next,
            None => break,
        }
    }

    let begin = path.iter().position(|&i| i == current).unwrap_or(0);
    let mut cycle: Vec<String> = path[begin..]
        .iter()
        .map(|&i| records[i].name.clone())
        .collect();
    if let Some(first) = cycle.first().cloned() {
        cycle.push(first);
    }
    cycle
}

use crate::model::{CrossTabCell, OrderRecord};
use egui::Color32;
use std::collections::{BTreeMap, BTreeSet};

/// Order counts for every destination × factory pair seen in the selection.
#[derive(Debug, Clone, Default)]
pub struct CrossTab {
    pub destinations: Vec<String>,
    pub factories: Vec<String>,
    /// `counts[destination][factory]`
    pub counts: Vec<Vec<usize>>,
}

impl CrossTab {
    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty() || self.factories.is_empty()
    }

    #[cfg(test)]
    pub fn count(&self, destination: &str, factory: &str) -> usize {
        let row = self.destinations.iter().position(|d| d == destination);
        let col = self.factories.iter().position(|f| f == factory);
        match (row, col) {
            (Some(r), Some(c)) => self.counts[r][c],
            _ => 0,
        }
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().flatten().copied().max().unwrap_or(0)
    }

    /// Long-form cells, factory by factory.
    pub fn triples(&self) -> Vec<CrossTabCell> {
        let mut cells = Vec::with_capacity(self.destinations.len() * self.factories.len());
        for (c, factory) in self.factories.iter().enumerate() {
            for (r, destination) in self.destinations.iter().enumerate() {
                cells.push(CrossTabCell {
                    destination: destination.clone(),
                    factory: factory.clone(),
                    count: self.counts[r][c],
                });
            }
        }
        cells
    }
}

pub fn cross_tabulate(rows: &[&OrderRecord]) -> CrossTab {
    let mut pairs: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    let mut destinations = BTreeSet::new();
    let mut factories = BTreeSet::new();

    for row in rows {
        destinations.insert(row.destination.as_str());
        factories.insert(row.factory.as_str());
        *pairs
            .entry((row.destination.as_str(), row.factory.as_str()))
            .or_default() += 1;
    }

    let counts: Vec<Vec<usize>> = destinations
        .iter()
        .map(|d| {
            factories
                .iter()
                .map(|f| pairs.get(&(*d, *f)).copied().unwrap_or(0))
                .collect()
        })
        .collect();

    CrossTab {
        destinations: destinations.into_iter().map(String::from).collect(),
        factories: factories.into_iter().map(String::from).collect(),
        counts,
    }
}

/// Sequential blue ramp, `t` in 0..=1.
pub fn blues(t: f32) -> Color32 {
    const LIGHT: [f32; 3] = [247.0, 251.0, 255.0];
    const DARK: [f32; 3] = [8.0, 48.0, 107.0];

    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let mix = |i: usize| (LIGHT[i] + (DARK[i] - LIGHT[i]) * t).round() as u8;
    Color32::from_rgb(mix(0), mix(1), mix(2))
}

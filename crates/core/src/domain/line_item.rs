use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineItemId(pub u64);

/// One apartment's monitor placement. The monthly subtotal is always derived
/// from the stored inputs, never persisted on its own.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub monitor_count: u32,
    pub unit_price: u64,
}

impl LineItem {
    pub fn monthly_total(&self) -> u64 {
        u64::from(self.monitor_count).saturating_mul(self.unit_price)
    }

    /// An entry counts toward the quote once it has a name or a positive
    /// monitor count; untouched blank rows do not.
    pub fn contributes(&self) -> bool {
        !self.name.trim().is_empty() || self.monitor_count > 0
    }
}

/// Ordered collection of line items with stable identity. Ids are assigned
/// from a monotonic counter and survive removals, so an entry keeps its
/// identity regardless of display position.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItems {
    entries: Vec<(LineItemId, LineItem)>,
    next_id: u64,
}

impl LineItems {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, item: LineItem) -> LineItemId {
        self.next_id += 1;
        let id = LineItemId(self.next_id);
        self.entries.push((id, item));
        id
    }

    pub fn remove(&mut self, id: LineItemId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub fn get(&self, id: LineItemId) -> Option<&LineItem> {
        self.entries.iter().find(|(entry_id, _)| *entry_id == id).map(|(_, item)| item)
    }

    pub fn get_mut(&mut self, id: LineItemId) -> Option<&mut LineItem> {
        self.entries.iter_mut().find(|(entry_id, _)| *entry_id == id).map(|(_, item)| item)
    }

    pub fn iter(&self) -> impl Iterator<Item = (LineItemId, &LineItem)> {
        self.entries.iter().map(|(id, item)| (*id, item))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Contributing entries in insertion order, as owned snapshots.
    pub fn contributing(&self) -> Vec<LineItem> {
        self.entries
            .iter()
            .filter(|(_, item)| item.contributes())
            .map(|(_, item)| item.clone())
            .collect()
    }
}

impl FromIterator<LineItem> for LineItems {
    fn from_iter<I: IntoIterator<Item = LineItem>>(items: I) -> Self {
        let mut collection = Self::new();
        for item in items {
            collection.add(item);
        }
        collection
    }
}

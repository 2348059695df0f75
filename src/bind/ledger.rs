/// Call counts per bound function, in registration order.
#[derive(Debug, Default, Clone)]
pub struct CallLedger {
    entries: Vec<(String, u32)>,
}

impl CallLedger {
    /// Start tracking `name` at zero calls. Already-tracked names are left alone.
    pub fn seed(&mut self, name: &str) {
        if self.position(name).is_none() {
            self.entries.push((name.to_string(), 0));
        }
    }

    pub fn record(&mut self, name: &str) {
        match self.position(name) {
            Some(idx) => self.entries[idx].1 += 1,
            None => self.entries.push((name.to_string(), 1)),
        }
    }

    #[cfg(test)]
    pub fn count(&self, name: &str) -> u32 {
        self.position(name)
            .map(|idx| self.entries[idx].1)
            .unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn uncalled(&self) -> Vec<String> {
        self.names_where(|count| count == 0)
    }

    pub fn repeated(&self) -> Vec<String> {
        self.names_where(|count| count > 1)
    }

    fn names_where(&self, pred: impl Fn(u32) -> bool) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, count)| pred(*count))
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(n, _)| n == name)
    }
}

use ratatui::widgets::ListState;

/// One rendered entry: its visible label and the action bound to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry<A> {
    pub label: String,
    pub action: A,
}

/// A list container that is always fully replaced, never diffed.
#[derive(Debug, Clone)]
pub struct ListContainer<A> {
    entries: Vec<ListEntry<A>>,
    state: ListState,
}

impl<A> Default for ListContainer<A> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            state: ListState::default(),
        }
    }
}

impl<A> ListContainer<A> {
    pub fn clear(&mut self) {
        self.entries.clear();
        self.state.select(None);
    }

    /// Replaces the contents with one entry per item, in input order.
    ///
    /// `on_activate` runs once per item at render time, so each entry owns the
    /// identifiers of its own item.
    pub fn render_list<T, L, F>(&mut self, items: &[T], label: L, on_activate: F)
    where
        L: Fn(&T) -> String,
        F: Fn(&T) -> A,
    {
        self.entries = items
            .iter()
            .map(|item| ListEntry {
                label: label(item),
                action: on_activate(item),
            })
            .collect();
        self.state
            .select(if self.entries.is_empty() { None } else { Some(0) });
    }

    pub fn entries(&self) -> &[ListEntry<A>] {
        &self.entries
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|entry| entry.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn action(&self, index: usize) -> Option<&A> {
        self.entries.get(index).map(|entry| &entry.action)
    }

    pub fn selected(&self) -> Option<usize> {
        self.state.selected()
    }

    pub fn selected_action(&self) -> Option<&A> {
        self.selected().and_then(|index| self.action(index))
    }

    pub fn select(&mut self, index: usize) {
        if index < self.entries.len() {
            self.state.select(Some(index));
        }
    }

    pub fn select_next(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        let next = match self.state.selected() {
            Some(i) if i + 1 < self.entries.len() => i + 1,
            Some(i) => i,
            None => 0,
        };
        self.state.select(Some(next));
    }

    pub fn select_prev(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        let prev = self.state.selected().map_or(0, |i| i.saturating_sub(1));
        self.state.select(Some(prev));
    }

    pub fn state_mut(&mut self) -> &mut ListState {
        &mut self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Row {
        id: u32,
        name: &'static str,
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { id: 3, name: "Cid" },
            Row { id: 1, name: "Ann" },
            Row { id: 2, name: "Bob" },
        ]
    }

    #[test]
    fn render_keeps_input_order_and_labels() {
        let mut list = ListContainer::default();
        list.render_list(&rows(), |row| row.name.to_string(), |row| row.id);

        assert_eq!(list.labels().collect::<Vec<_>>(), vec!["Cid", "Ann", "Bob"]);
        assert_eq!(list.selected(), Some(0));
    }

    #[test]
    fn each_entry_captures_its_own_item() {
        let mut list = ListContainer::default();
        list.render_list(&rows(), |row| row.name.to_string(), |row| row.id);

        assert_eq!(list.action(0), Some(&3));
        assert_eq!(list.action(1), Some(&1));
        assert_eq!(list.action(2), Some(&2));
        assert_eq!(list.action(3), None);
    }

    #[test]
    fn rerender_replaces_previous_entries() {
        let mut list = ListContainer::default();
        list.render_list(&rows(), |row| row.name.to_string(), |row| row.id);
        list.render_list(&rows(), |row| row.name.to_string(), |row| row.id);
        assert_eq!(list.len(), 3);

        list.render_list(&rows()[..1], |row| row.name.to_string(), |row| row.id);
        assert_eq!(list.labels().collect::<Vec<_>>(), vec!["Cid"]);
    }

    #[test]
    fn selection_is_clamped_to_entries() {
        let mut list = ListContainer::default();
        list.select_next();
        assert_eq!(list.selected(), None);

        list.render_list(&rows(), |row| row.name.to_string(), |row| row.id);
        list.select_next();
        list.select_next();
        list.select_next();
        assert_eq!(list.selected(), Some(2));
        assert_eq!(list.selected_action(), Some(&2));

        list.select_prev();
        list.select_prev();
        list.select_prev();
        assert_eq!(list.selected(), Some(0));

        list.select(9);
        assert_eq!(list.selected(), Some(0));

        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.selected_action(), None);
    }
}

use crate::core::model::ModelDescriptor;

#[derive(Debug, Clone)]
pub struct ModelPicker {
    pub items: Vec<ModelDescriptor>,
    pub selected: usize,
}

impl ModelPicker {
    /// Starts on the active model when it is listed.
    pub fn new(items: Vec<ModelDescriptor>, active: &str) -> Self {
        let selected = items.iter().position(|m| m.id == active).unwrap_or(0);
        Self { items, selected }
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.items.get(self.selected).map(|m| m.id.as_str())
    }

    pub fn move_up(&mut self) {
        if !self.items.is_empty() {
            if self.selected == 0 {
                self.selected = self.items.len() - 1;
            } else {
                self.selected -= 1;
            }
        }
    }

    pub fn move_down(&mut self) {
        if !self.items.is_empty() {
            self.selected = (self.selected + 1) % self.items.len();
        }
    }
}

/// Callback fired with the new text after every change
pub type ChangeListener = Box<dyn FnMut(&str)>;

/// The text editing widget
pub trait TextSurface {
    fn text(&self) -> String;
    /// Replace the text and notify change listeners
    fn set_text(&mut self, text: &str);
    fn on_change(&mut self, listener: ChangeListener);
}

/// Plain in-memory editing surface
#[derive(Default)]
pub struct BufferSurface {
    text: String,
    listeners: Vec<ChangeListener>,
}

impl BufferSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TextSurface for BufferSurface {
    fn text(&self) -> String {
        self.text.clone()
    }

    fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        for listener in &mut self.listeners {
            listener(&self.text);
        }
    }

    fn on_change(&mut self, listener: ChangeListener) {
        self.listeners.push(listener);
    }
}

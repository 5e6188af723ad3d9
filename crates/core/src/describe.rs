/// Produces the default description offered for a scene before the user edits it.
pub trait Describer: Send + Sync {
    fn describe(&self, image: &str) -> String;
}

pub const DEFAULT_TEMPLATE: &str = "Description generated from {image}.";

/// Fills `{image}` in a fixed template. Stands in for real captioning.
#[derive(Debug, Clone)]
pub struct TemplateDescriber {
    template: String,
}

impl TemplateDescriber {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }
}

impl Default for TemplateDescriber {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE)
    }
}

impl Describer for TemplateDescriber {
    fn describe(&self, image: &str) -> String {
        self.template.replace("{image}", image)
    }
}

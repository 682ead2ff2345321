use crate::console::{color, Console};
use crate::error::ToolInitError;
use crate::tool::Tool;

/// Ordered, immutable set of tools. Order drives listing and lookup
/// priority: with duplicate tokens the first registered tool wins.
pub struct Registry {
    tools: Vec<Box<dyn Tool>>,
}

impl Registry {
    pub fn new(tools: Vec<Box<dyn Tool>>) -> Self {
        Self { tools }
    }

    /// Keep every tool that constructed; report the others and move on.
    pub fn from_builders<I>(results: I, console: &mut Console<'_>) -> Self
    where
        I: IntoIterator<Item = Result<Box<dyn Tool>, ToolInitError>>,
    {
        let mut tools = Vec::new();
        for result in results {
            match result {
                Ok(tool) => {
                    log::debug!("registered {} {} as {}", tool.name(), tool.version(), tool.invocation().label);
                    tools.push(tool);
                }
                Err(e) => {
                    log::warn!("{e}");
                    console.warn(e.to_string());
                }
            }
        }
        Self { tools }
    }

    pub fn find(&self, token: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|t| t.invocation().matches(token))
            .map(|t| t.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Tool> {
        self.tools.iter().map(|t| t.as_ref())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Table of registered tools: index, name, command label, version, workspace.
    pub fn render_listing(&self, console: &Console<'_>) -> String {
        let mut rows = vec![format!(
            "   *  {:<12}{:<16}{:<9}Path",
            "Name", "Command", "Version"
        )];
        for (i, tool) in self.iter().enumerate() {
            let path = tool
                .workspace()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "-".to_string());
            rows.push(format!(
                "  {:>2}. {}{:<16}{:<9}{}",
                i + 1,
                console.paint(color::CYAN, &format!("{:<12}", tool.name())),
                tool.invocation().label,
                tool.version(),
                console.paint(color::YELLOW, &path),
            ));
        }
        rows.join("\n")
    }
}

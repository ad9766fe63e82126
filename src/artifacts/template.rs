use crate::config::RunConfig;
use crate::error::{Result, ResultIoExt};
use crate::models::Snapshot;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::Path;
use tera::{Context, Tera, Value};

const TEMPLATE_NAME: &str = "page";

/// Timestamp shown on the rendered page (UTC)
pub const PAGE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Compiled page template
pub struct PageTemplate {
    tera: Tera,
}

impl PageTemplate {
    /// Read and compile a template file
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_io_err(path)?;
        Self::from_source(&source)
    }

    pub fn from_source(source: &str) -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_template(TEMPLATE_NAME, source)?;
        tera.register_filter("timeago", timeago);
        Ok(Self { tera })
    }

    pub fn render(
        &self,
        snapshot: &Snapshot,
        config: &RunConfig,
        now: DateTime<Utc>,
    ) -> Result<String> {
        let mut context = Context::new();
        context.insert("packages", &snapshot.records);
        context.insert("timestamp", &now.format(PAGE_TIME_FORMAT).to_string());
        context.insert("title", config.page_title());
        context.insert("description", &config.description);
        context.insert("baseurl", &config.baseurl);
        context.insert("basepath", &config.basepath);
        context.insert("page_url", &config.page_url());
        context.insert("feed_url", &config.feed_url());

        Ok(self.tera.render(TEMPLATE_NAME, &context)?)
    }
}

/// Render a day count as "today", "1 day ago" or "N days ago"
fn timeago(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let days = value
        .as_u64()
        .ok_or_else(|| tera::Error::msg("timeago expects a non-negative integer"))?;

    let text = match days {
        0 => "today".to_string(),
        1 => "1 day ago".to_string(),
        n => format!("{} days ago", n),
    };

    Ok(Value::String(text))
}

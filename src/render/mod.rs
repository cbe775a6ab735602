use anyhow::{anyhow, Context as _, Result};
use std::path::Path;
use tera::{Context, Tera};

use crate::models::{PlanEntry, RenderPlan, RenderedConfig, TemplateKind};

/// Turns one plan entry into configuration text
pub trait ConfigRenderer: Send + Sync {
    fn render(&self, entry: &PlanEntry) -> Result<String>;
}

/// Renders plan entries with Tera templates named by their template id
pub struct TeraRenderer {
    tera: Tera,
}

impl TeraRenderer {
    /// Load every `*.j2` file in `dir`; templates are addressed by file name
    pub fn from_dir(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(anyhow!("Template directory not found: {}", dir.display()));
        }
        let glob = dir.join("*.j2");
        let glob = glob
            .to_str()
            .ok_or_else(|| anyhow!("Template path is not valid UTF-8: {}", dir.display()))?;
        let tera = Tera::new(glob)
            .map_err(|e| anyhow::Error::new(e).context(format!("Invalid template in {}", dir.display())))?;

        tracing::info!(
            "Loaded {} templates from {}",
            tera.get_template_names().count(),
            dir.display()
        );
        Ok(Self { tera })
    }

    pub fn from_raw(templates: &[(&str, &str)]) -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(templates.iter().copied())
            .map_err(|e| anyhow::Error::new(e).context("Invalid template"))?;
        Ok(Self { tera })
    }
}

impl ConfigRenderer for TeraRenderer {
    fn render(&self, entry: &PlanEntry) -> Result<String> {
        let context = Context::from_serialize(&entry.context)
            .map_err(|e| anyhow!("Invalid context for {}: {}", entry.template_id, e))?;
        self.tera
            .render(&entry.template_id, &context)
            .map_err(|e| anyhow::Error::new(e).context(format!("Template rendering failed for {}", entry.template_id)))
    }
}

/// Render every entry of a plan; the first failure aborts
pub fn render_plan(renderer: &dyn ConfigRenderer, plan: &RenderPlan) -> Result<RenderedConfig> {
    let mut rendered = RenderedConfig::default();
    for entry in &plan.entries {
        let text = renderer
            .render(entry)
            .with_context(|| format!("Rendering {}", entry.template_id))?;
        match entry.kind() {
            TemplateKind::Global => rendered.global = text,
            TemplateKind::Uplink => rendered.uplink = text,
            TemplateKind::Access => rendered.access = text,
        }
    }
    Ok(rendered)
}

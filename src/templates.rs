//! Renders commit messages and PR titles/bodies from the manifest's
//! Handlebars templates, substituting `Module`, `Version`, and `Repo`.

use handlebars::Handlebars;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("failed to render template: {0}")]
    Render(#[from] handlebars::RenderError),
}

pub const DEFAULT_COMMIT_MESSAGE: &str = "chore: bump {{Module}} to {{Version}}";
pub const DEFAULT_PR_TITLE: &str = "chore: bump {{Module}} to {{Version}}";
pub const DEFAULT_PR_BODY: &str = "Bumps `{{Module}}` to `{{Version}}` in this repository.";

pub struct TemplateRenderer {
    handlebars: Handlebars<'static>,
}

impl TemplateRenderer {
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);
        Self { handlebars }
    }

    pub fn render(&self, template: &str, module: &str, version: &str, repo: &str) -> Result<String, TemplateError> {
        let module_basename = module.rsplit('/').next().unwrap_or(module);
        let data = json!({
            "Module": module,
            "Version": version,
            "Repo": repo,
            "ModuleBasename": module_basename,
        });
        Ok(self.handlebars.render_template(template, &data)?)
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_default_commit_message() {
        let renderer = TemplateRenderer::new();
        let rendered = renderer.render(DEFAULT_COMMIT_MESSAGE, "github.com/example/lib", "v1.2.3", "owner/repo").unwrap();
        assert_eq!(rendered, "chore: bump github.com/example/lib to v1.2.3");
    }

    #[test]
    fn renders_module_basename_helper_variable() {
        let renderer = TemplateRenderer::new();
        let rendered = renderer.render("{{ModuleBasename}}@{{Version}}", "github.com/example/lib", "v1.2.3", "owner/repo").unwrap();
        assert_eq!(rendered, "lib@v1.2.3");
    }

    #[test]
    fn unknown_variables_render_empty_in_non_strict_mode() {
        let renderer = TemplateRenderer::new();
        let rendered = renderer.render("{{NotARealVariable}}", "m", "v1.0.0", "r").unwrap();
        assert_eq!(rendered, "");
    }
}

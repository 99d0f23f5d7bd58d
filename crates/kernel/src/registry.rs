use std::sync::Arc;

use anyhow::Context;

use crate::module::{InitCtx, Migration, Module};

/// Ordered set of modules. Init and start follow registration order, stop runs in reverse.
#[derive(Default)]
pub struct ModuleRegistry {
    modules: Vec<Arc<dyn Module>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, module: Arc<dyn Module>) {
        tracing::debug!(module = module.name(), "module registered");
        self.modules.push(module);
    }

    pub fn modules(&self) -> impl Iterator<Item = &Arc<dyn Module>> {
        self.modules.iter()
    }

    pub fn get_module(&self, name: &str) -> Option<&Arc<dyn Module>> {
        self.modules.iter().find(|module| module.name() == name)
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    pub async fn init_modules(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        for module in &self.modules {
            tracing::info!(module = module.name(), "init");
            module
                .init(ctx)
                .await
                .with_context(|| format!("module '{}' failed to initialize", module.name()))?;
        }
        Ok(())
    }

    pub async fn start_modules(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        for module in &self.modules {
            tracing::info!(module = module.name(), "start");
            module
                .start(ctx)
                .await
                .with_context(|| format!("module '{}' failed to start", module.name()))?;
        }
        Ok(())
    }

    pub async fn stop_modules(&self) -> anyhow::Result<()> {
        for module in self.modules.iter().rev() {
            tracing::info!(module = module.name(), "stop");
            module
                .stop()
                .await
                .with_context(|| format!("module '{}' failed to stop", module.name()))?;
        }
        Ok(())
    }

    /// Every module's migrations tagged with the module name, ordered by
    /// `(module, id)` so the run order never depends on registration order.
    pub fn collect_migrations(&self) -> Vec<(String, Migration)> {
        let mut migrations: Vec<_> = self
            .modules
            .iter()
            .flat_map(|module| {
                module
                    .migrations()
                    .into_iter()
                    .map(move |migration| (module.name().to_string(), migration))
            })
            .collect();
        migrations.sort_by(|(a, x), (b, y)| a.cmp(b).then_with(|| x.id.cmp(y.id)));
        migrations
    }
}

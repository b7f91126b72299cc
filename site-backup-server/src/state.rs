use crate::config::AppConfig;
use crate::ws::ui::UiBroadcaster;
use site_backup::executor::BackupPipeline;

pub struct AppState {
    pub config: AppConfig,
    pub pipeline: BackupPipeline,
    pub ui: UiBroadcaster,
}

impl AppState {
    pub fn new(config: AppConfig, pipeline: BackupPipeline) -> Self {
        Self {
            config,
            pipeline,
            ui: UiBroadcaster::new(),
        }
    }
}

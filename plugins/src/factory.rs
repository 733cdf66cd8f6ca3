use anyhow::Result;

use dagen_core::api::{ApiConfig, DeploymentApi};

use crate::api::HttpDeploymentApi;

pub fn build_deployment_api(cfg: &ApiConfig) -> Result<Box<dyn DeploymentApi>> {
    Ok(Box::new(HttpDeploymentApi::new(cfg)?))
}

pub mod constants;
pub mod genesis;
pub mod params;

use std::ops::Deref;

use crate::{
    errors::config::{ConfigError, ConfigResult},
    upgrades::{ActivationHeight, UpgradeIndex},
};
use params::{OverrideParams, Params};
use rapids_core::{info, warn};

/// Various consensus configurations all bundled up under a single struct. Use `Config::new` for directly building from
/// a `Params` instance. For anything more complex it is recommended to use `ConfigBuilder`. NOTE: this struct can be
/// implicitly de-refed into `Params`
#[derive(Clone, Debug)]
pub struct Config {
    /// Consensus params
    pub params: Params,

    //
    // Additional consensus configuration arguments which are not consensus sensitive
    //
    /// Reject blocks which contradict the hardcoded checkpoints
    pub enforce_checkpoints: bool,
}

impl Config {
    pub fn new(params: Params) -> Self {
        Self { params, enforce_checkpoints: true }
    }

    pub fn to_builder(&self) -> ConfigBuilder {
        ConfigBuilder { config: self.clone(), error: None }
    }
}

impl AsRef<Params> for Config {
    fn as_ref(&self) -> &Params {
        &self.params
    }
}

impl Deref for Config {
    type Target = Params;

    fn deref(&self) -> &Self::Target {
        &self.params
    }
}

/// Chained construction of a [`Config`]. A failing step is remembered and reported by [`ConfigBuilder::build`],
/// later steps are skipped.
pub struct ConfigBuilder {
    config: Config,
    error: Option<ConfigError>,
}

impl ConfigBuilder {
    pub fn new(params: Params) -> Self {
        Self { config: Config::new(params), error: None }
    }

    pub fn edit_consensus_params<F>(mut self, edit_func: F) -> Self
    where
        F: Fn(&mut Params),
    {
        if self.error.is_none() {
            edit_func(&mut self.config.params);
        }
        self
    }

    pub fn override_upgrade(mut self, index: UpgradeIndex, activation: ActivationHeight) -> Self {
        if self.error.is_none() {
            match self.config.params.update_network_upgrade(index, activation) {
                Ok(()) => info!("Network upgrade {} of {} set to activate at {}", index, self.config.params.net, activation),
                Err(err) => self.error = Some(err),
            }
        }
        self
    }

    pub fn apply_overrides(mut self, overrides: OverrideParams) -> Self {
        if self.error.is_none() {
            match self.config.params.clone().override_params(overrides) {
                Ok(params) => {
                    warn!("Consensus parameters of {} were overridden", params.net);
                    self.config.params = params;
                }
                Err(err) => self.error = Some(err),
            }
        }
        self
    }

    pub fn apply_args<F>(mut self, edit_func: F) -> Self
    where
        F: Fn(&mut Config),
    {
        if self.error.is_none() {
            edit_func(&mut self.config);
        }
        self
    }

    pub fn skip_checkpoints(mut self) -> Self {
        self.config.enforce_checkpoints = false;
        self
    }

    pub fn build(self) -> ConfigResult<Config> {
        if let Some(err) = self.error {
            return Err(err);
        }
        self.config.params.validate()?;
        Ok(self.config)
    }
}

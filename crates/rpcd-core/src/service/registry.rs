//! Object registry and request dispatch.

use super::{Context, NetworkService, Service, SystemService};
use crate::payload::{validate, ResponseBuilder};
use rpcd_common::{Error, Result};
use rpcd_config::{ConfigStore, DaemonConfig, UciStore};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

/// The registered bus objects plus what their handlers read.
pub struct Registry {
    config: DaemonConfig,
    store: Box<dyn ConfigStore>,
    services: Vec<Box<dyn Service>>,
}

impl Registry {
    /// Registry with both standard objects and an explicit config store.
    pub fn new(config: DaemonConfig, store: Box<dyn ConfigStore>) -> Self {
        Self {
            config,
            store,
            services: vec![
                Box::new(SystemService::new()),
                Box::new(NetworkService::new()),
            ],
        }
    }

    /// Registry reading UCI packages from the configured directory.
    pub fn from_config(config: DaemonConfig) -> Self {
        let store = UciStore::new(config.paths.uci_dir.clone());
        Self::new(config, Box::new(store))
    }

    pub fn config(&self) -> &DaemonConfig {
        &self.config
    }

    pub fn objects(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.services.iter().map(|s| s.name())
    }

    fn service(&self, object: &str) -> Option<&dyn Service> {
        self.services
            .iter()
            .find(|s| s.name() == object)
            .map(|s| s.as_ref())
    }

    /// Validate `params` and run `object.method`.
    ///
    /// `params` may be `Null` for methods without arguments.
    #[instrument(skip_all, fields(object = %object, method = %method))]
    pub fn call(&self, object: &str, method: &str, params: &Value) -> Result<Value> {
        let service = self
            .service(object)
            .ok_or_else(|| Error::MethodNotFound(format!("unknown object `{object}`")))?;
        let def = service
            .method(method)
            .ok_or_else(|| Error::MethodNotFound(format!("unknown method `{object}.{method}`")))?;

        let args = validate(def.schema, params)?;
        let ctx = Context {
            config: &self.config,
            store: self.store.as_ref(),
        };

        let mut out = ResponseBuilder::new();
        service.call(&ctx, method, &args, &mut out)?;
        let payload = out.finish()?;

        debug!("call complete");
        Ok(payload)
    }

    /// Method signatures: `{object: {method: {field: type}}}`.
    ///
    /// With `object`, only that object is listed; an unknown one is
    /// not-found.
    pub fn list(&self, object: Option<&str>) -> Result<Value> {
        let services: Vec<&dyn Service> = match object {
            Some(name) => vec![self
                .service(name)
                .ok_or_else(|| Error::NotFound(format!("object `{name}`")))?],
            None => self.services.iter().map(|s| s.as_ref()).collect(),
        };

        let mut objects = Map::new();
        for service in services {
            let mut methods = Map::new();
            for def in service.methods() {
                let fields: Map<String, Value> = def
                    .schema
                    .iter()
                    .map(|f| (f.name.to_string(), Value::from(f.kind.as_str())))
                    .collect();
                methods.insert(def.name.to_string(), Value::Object(fields));
            }
            objects.insert(service.name().to_string(), Value::Object(methods));
        }

        Ok(Value::Object(objects))
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("config", &self.config)
            .field("objects", &self.objects().collect::<Vec<_>>())
            .finish()
    }
}

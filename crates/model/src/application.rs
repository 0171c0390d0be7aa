//! Applications
//!
//! An application owns its units and offers as nested collections, and
//! embeds its charm documents, constraints and provider service record.
//! Version history:
//!
//! | Version | Change |
//! |---------|--------|
//! | 2 | offers |
//! | 3 | password hash, placement, resources flag, desired scale, cloud service |
//! | 4 | exposed endpoints |
//! | 5 | charm origin, metadata, manifest and config |

use crate::charm::{CharmConfig, CharmManifest, CharmMetadata, CharmOrigin};
use crate::cloud_container::{CloudService, CloudServiceArgs};
use crate::constraints::{Constraints, ConstraintsArgs};
use crate::offer::{ApplicationOffer, ApplicationOfferArgs};
use crate::status::{StatusArgs, StatusHistory, StatusPoint};
use crate::unit::{Unit, UnitArgs};
use modeldoc_core::tag::is_valid_application_name;
use modeldoc_core::{Error, Map, Result, ResultExt, Value};
use modeldoc_schema::checker::{
    any, envelope, bool, bytes, fields, force_uint, int, list, string, string_map,
};
use modeldoc_schema::{FieldSchema, Fields, MapBuilder, SchemaRegistry, ToWire, VersionedEntity};
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// Storage requested for a named charm store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageDirective {
    /// Storage pool
    pub pool: String,
    /// Size in MiB
    pub size: u64,
    /// Instance count
    pub count: u64,
}

/// Who an exposed endpoint is reachable from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExposedEndpoint {
    /// Space ids allowed to reach the endpoint
    pub expose_to_spaces: Vec<String>,
    /// CIDRs allowed to reach the endpoint
    pub expose_to_cidrs: Vec<String>,
}

/// Arguments for [`Application`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplicationArgs {
    /// Application name
    pub name: String,
    /// Legacy series
    pub series: String,
    /// Whether the application is a subordinate
    pub subordinate: bool,
    /// Charm URL
    pub charm_url: String,
    /// Charm store channel
    pub channel: String,
    /// Charm modified version
    pub charm_mod_version: i64,
    /// Whether the charm was forced
    pub force_charm: bool,
    /// Whether the application is exposed
    pub exposed: bool,
    /// Exposed endpoints by endpoint name
    pub exposed_endpoints: BTreeMap<String, ExposedEndpoint>,
    /// Minimum unit count
    pub min_units: i64,
    /// Agent password hash
    pub password_hash: String,
    /// Placement directive
    pub placement: String,
    /// Whether the charm has resources
    pub has_resources: bool,
    /// Desired unit count for container-based models
    pub desired_scale: i64,
    /// Charm settings
    pub settings: Map,
    /// Leader unit name
    pub leader: String,
    /// Leadership settings
    pub leadership_settings: Map,
    /// Metrics credentials blob
    pub metrics_creds: Vec<u8>,
    /// Storage directives by store name
    pub storage_directives: BTreeMap<String, StorageDirective>,
    /// Endpoint to space bindings
    pub endpoint_bindings: BTreeMap<String, String>,
}

/// An application and its units
#[derive(Debug, Clone, PartialEq)]
pub struct Application {
    args: ApplicationArgs,
    status: Option<StatusPoint>,
    status_history: StatusHistory,
    annotations: BTreeMap<String, String>,
    constraints: Option<Constraints>,
    cloud_service: Option<CloudService>,
    charm_origin: Option<CharmOrigin>,
    charm_metadata: Option<CharmMetadata>,
    charm_manifest: Option<CharmManifest>,
    charm_config: Option<CharmConfig>,
    units: Vec<Unit>,
    offers: Vec<ApplicationOffer>,
}

impl Application {
    /// Create an application
    pub fn new(args: ApplicationArgs) -> Self {
        Application {
            args,
            status: None,
            status_history: StatusHistory::default(),
            annotations: BTreeMap::new(),
            constraints: None,
            cloud_service: None,
            charm_origin: None,
            charm_metadata: None,
            charm_manifest: None,
            charm_config: None,
            units: Vec::new(),
            offers: Vec::new(),
        }
    }

    /// Application name
    pub fn name(&self) -> &str {
        &self.args.name
    }

    /// Legacy series
    pub fn series(&self) -> &str {
        &self.args.series
    }

    /// Whether the application is a subordinate
    pub fn subordinate(&self) -> bool {
        self.args.subordinate
    }

    /// Charm URL
    pub fn charm_url(&self) -> &str {
        &self.args.charm_url
    }

    /// Charm store channel
    pub fn channel(&self) -> &str {
        &self.args.channel
    }

    /// Charm modified version
    pub fn charm_mod_version(&self) -> i64 {
        self.args.charm_mod_version
    }

    /// Whether the charm was forced
    pub fn force_charm(&self) -> bool {
        self.args.force_charm
    }

    /// Whether the application is exposed
    pub fn exposed(&self) -> bool {
        self.args.exposed
    }

    /// Exposed endpoints
    pub fn exposed_endpoints(&self) -> &BTreeMap<String, ExposedEndpoint> {
        &self.args.exposed_endpoints
    }

    /// Minimum unit count
    pub fn min_units(&self) -> i64 {
        self.args.min_units
    }

    /// Agent password hash
    pub fn password_hash(&self) -> &str {
        &self.args.password_hash
    }

    /// Placement directive
    pub fn placement(&self) -> &str {
        &self.args.placement
    }

    /// Whether the charm has resources
    pub fn has_resources(&self) -> bool {
        self.args.has_resources
    }

    /// Desired unit count
    pub fn desired_scale(&self) -> i64 {
        self.args.desired_scale
    }

    /// Charm settings
    pub fn settings(&self) -> &Map {
        &self.args.settings
    }

    /// Leader unit name
    pub fn leader(&self) -> &str {
        &self.args.leader
    }

    /// Leadership settings
    pub fn leadership_settings(&self) -> &Map {
        &self.args.leadership_settings
    }

    /// Metrics credentials blob
    pub fn metrics_creds(&self) -> &[u8] {
        &self.args.metrics_creds
    }

    /// Storage directives
    pub fn storage_directives(&self) -> &BTreeMap<String, StorageDirective> {
        &self.args.storage_directives
    }

    /// Endpoint bindings
    pub fn endpoint_bindings(&self) -> &BTreeMap<String, String> {
        &self.args.endpoint_bindings
    }

    /// Application status
    pub fn status(&self) -> Option<&StatusPoint> {
        self.status.as_ref()
    }

    /// Set the application status
    pub fn set_status(&mut self, args: StatusArgs) {
        self.status = Some(StatusPoint::new(args));
    }

    /// Earlier application statuses
    pub fn status_history(&self) -> &[StatusPoint] {
        self.status_history.status_history()
    }

    /// Replace the earlier application statuses
    pub fn set_status_history(&mut self, args: Vec<StatusArgs>) {
        self.status_history.set_status_history(args);
    }

    /// Annotations
    pub fn annotations(&self) -> &BTreeMap<String, String> {
        &self.annotations
    }

    /// Replace the annotations
    pub fn set_annotations(&mut self, annotations: BTreeMap<String, String>) {
        self.annotations = annotations;
    }

    /// Constraints, `None` when unconstrained
    pub fn constraints(&self) -> Option<&Constraints> {
        self.constraints.as_ref()
    }

    /// Set the constraints; empty arguments clear them
    pub fn set_constraints(&mut self, args: ConstraintsArgs) {
        self.constraints = Constraints::new(args);
    }

    /// Provider service
    pub fn cloud_service(&self) -> Option<&CloudService> {
        self.cloud_service.as_ref()
    }

    /// Set the provider service
    pub fn set_cloud_service(&mut self, args: CloudServiceArgs) {
        self.cloud_service = Some(CloudService::new(args));
    }

    /// Charm origin
    pub fn charm_origin(&self) -> Option<&CharmOrigin> {
        self.charm_origin.as_ref()
    }

    /// Set the charm origin
    pub fn set_charm_origin(&mut self, origin: CharmOrigin) {
        self.charm_origin = Some(origin);
    }

    /// Charm metadata
    pub fn charm_metadata(&self) -> Option<&CharmMetadata> {
        self.charm_metadata.as_ref()
    }

    /// Set the charm metadata
    pub fn set_charm_metadata(&mut self, metadata: CharmMetadata) {
        self.charm_metadata = Some(metadata);
    }

    /// Charm manifest
    pub fn charm_manifest(&self) -> Option<&CharmManifest> {
        self.charm_manifest.as_ref()
    }

    /// Set the charm manifest
    pub fn set_charm_manifest(&mut self, manifest: CharmManifest) {
        self.charm_manifest = Some(manifest);
    }

    /// Charm config schema
    pub fn charm_config(&self) -> Option<&CharmConfig> {
        self.charm_config.as_ref()
    }

    /// Set the charm config schema
    pub fn set_charm_config(&mut self, config: CharmConfig) {
        self.charm_config = Some(config);
    }

    /// Units
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Add a unit and return it for further setup
    pub fn add_unit(&mut self, args: UnitArgs) -> &mut Unit {
        self.units.push(Unit::new(args));
        let last = self.units.len() - 1;
        &mut self.units[last]
    }

    /// Offers
    pub fn offers(&self) -> &[ApplicationOffer] {
        &self.offers
    }

    /// Add an offer
    pub fn add_offer(&mut self, args: ApplicationOfferArgs) -> &ApplicationOffer {
        self.offers.push(ApplicationOffer::new(args));
        let last = self.offers.len() - 1;
        &self.offers[last]
    }

    /// Check the application and its units
    pub fn validate(&self) -> Result<()> {
        let name = &self.args.name;
        if !is_valid_application_name(name) {
            return Err(Error::not_valid(format!("application name {name:?}")));
        }
        if self.status.is_none() {
            return Err(Error::validation(format!(
                "application {name:?} missing status"
            )));
        }
        for unit in &self.units {
            unit.validate()
                .annotate_with(|| format!("application {name:?}"))?;
        }
        if !self.args.leader.is_empty() && !self.units.iter().any(|u| u.name() == self.args.leader)
        {
            return Err(Error::validation(format!(
                "application {name:?} leader {:?} is not one of its units",
                self.args.leader
            )));
        }
        Ok(())
    }
}

fn storage_directive_schema() -> FieldSchema {
    FieldSchema::new()
        .required("pool", string())
        .required("size", force_uint())
        .required("count", force_uint())
}

fn exposed_endpoint_schema() -> FieldSchema {
    FieldSchema::new()
        .omit("expose-to-spaces", list(string()))
        .omit("expose-to-cidrs", list(string()))
}

fn application_v1() -> FieldSchema {
    FieldSchema::new()
        .required("name", string())
        .optional("series", string(), "")
        .optional("subordinate", bool(), false)
        .required("charm-url", string())
        .optional("cs-channel", string(), "")
        .optional("charm-mod-version", int(), 0)
        .optional("force-charm", bool(), false)
        .optional("exposed", bool(), false)
        .optional("min-units", int(), 0)
        .required("status", envelope())
        .required("status-history", envelope())
        .required("settings", string_map(any()))
        .optional("leader", string(), "")
        .required("leadership-settings", string_map(any()))
        .omit("metrics-creds", bytes())
        .omit("storage-constraints", string_map(fields(storage_directive_schema())))
        .omit("endpoint-bindings", string_map(string()))
        .omit("annotations", string_map(string()))
        .omit("constraints", any())
        .required("units", envelope())
}

fn application_v2() -> FieldSchema {
    application_v1().omit("offers", any())
}

fn application_v3() -> FieldSchema {
    application_v2()
        .optional("password-hash", string(), "")
        .optional("placement", string(), "")
        .optional("has-resources", bool(), false)
        .optional("desired-scale", int(), 0)
        .omit("cloud-service", any())
}

fn application_v4() -> FieldSchema {
    application_v3().omit(
        "exposed-endpoints",
        string_map(fields(exposed_endpoint_schema())),
    )
}

fn application_v5() -> FieldSchema {
    application_v4()
        .omit("charm-origin", any())
        .omit("charm-metadata", any())
        .omit("charm-manifest", any())
        .omit("charm-config", any())
}

static REGISTRY: Lazy<SchemaRegistry> = Lazy::new(|| {
    SchemaRegistry::new(
        "application",
        &[
            (1, application_v1),
            (2, application_v2),
            (3, application_v3),
            (4, application_v4),
            (5, application_v5),
        ],
    )
});

impl VersionedEntity for Application {
    const KIND: &'static str = "application";

    fn registry() -> &'static SchemaRegistry {
        &REGISTRY
    }

    fn import(fields: Fields, version: u32) -> Result<Self> {
        let storage_directives = fields
            .field_map("storage-constraints")?
            .into_iter()
            .map(|(name, f)| {
                Ok((
                    name,
                    StorageDirective {
                        pool: f.string("pool")?,
                        size: f.uint("size")?,
                        count: f.uint("count")?,
                    },
                ))
            })
            .collect::<Result<_>>()?;
        let mut args = ApplicationArgs {
            name: fields.string("name")?,
            series: fields.string("series")?,
            subordinate: fields.bool("subordinate")?,
            charm_url: fields.string("charm-url")?,
            channel: fields.string("cs-channel")?,
            charm_mod_version: fields.int("charm-mod-version")?,
            force_charm: fields.bool("force-charm")?,
            exposed: fields.bool("exposed")?,
            min_units: fields.int("min-units")?,
            settings: fields.map("settings")?,
            leader: fields.string("leader")?,
            leadership_settings: fields.map("leadership-settings")?,
            metrics_creds: fields.opt_bytes("metrics-creds")?.unwrap_or_default(),
            storage_directives,
            endpoint_bindings: fields.string_map("endpoint-bindings")?,
            ..Default::default()
        };
        if version >= 3 {
            args.password_hash = fields.string("password-hash")?;
            args.placement = fields.string("placement")?;
            args.has_resources = fields.bool("has-resources")?;
            args.desired_scale = fields.int("desired-scale")?;
        }
        if version >= 4 {
            args.exposed_endpoints = fields
                .field_map("exposed-endpoints")?
                .into_iter()
                .map(|(name, f)| {
                    Ok((
                        name,
                        ExposedEndpoint {
                            expose_to_spaces: f.strings("expose-to-spaces")?,
                            expose_to_cidrs: f.strings("expose-to-cidrs")?,
                        },
                    ))
                })
                .collect::<Result<_>>()?;
        }

        let mut app = Application::new(args);
        app.status = Some(fields.required_embedded::<StatusPoint>("status", "status")?);
        app.status_history = StatusHistory::import(&fields, "status-history")?;
        app.annotations = fields.string_map("annotations")?;
        app.constraints = Constraints::import_optional(&fields, "constraints")?;
        app.units = fields.collection::<Unit>("units")?;
        if version >= 2 {
            app.offers = fields.collection::<ApplicationOffer>("offers")?;
        }
        if version >= 3 {
            app.cloud_service = fields.embedded::<CloudService>("cloud-service", "service")?;
        }
        if version >= 5 {
            app.charm_origin = fields.embedded::<CharmOrigin>("charm-origin", "charm-origin")?;
            app.charm_metadata =
                fields.embedded::<CharmMetadata>("charm-metadata", "charm-metadata")?;
            app.charm_manifest =
                fields.embedded::<CharmManifest>("charm-manifest", "charm-manifest")?;
            app.charm_config = fields.embedded::<CharmConfig>("charm-config", "charm-config")?;
        }
        Ok(app)
    }
}

impl ToWire for Application {
    fn to_wire(&self) -> Value {
        let a = &self.args;
        let storage: Map = a
            .storage_directives
            .iter()
            .map(|(name, d)| {
                let v = MapBuilder::new()
                    .field("pool", d.pool.as_str())
                    .field("size", d.size)
                    .field("count", d.count)
                    .into_value();
                (name.clone(), v)
            })
            .collect();
        let exposed: Map = a
            .exposed_endpoints
            .iter()
            .map(|(name, e)| {
                let v = MapBuilder::new()
                    .nonempty_strings("expose-to-spaces", &e.expose_to_spaces)
                    .nonempty_strings("expose-to-cidrs", &e.expose_to_cidrs)
                    .into_value();
                (name.clone(), v)
            })
            .collect();
        let mut builder = MapBuilder::new()
            .field("name", a.name.as_str())
            .nonempty("series", &a.series)
            .field("subordinate", a.subordinate)
            .field("charm-url", a.charm_url.as_str())
            .nonempty("cs-channel", &a.channel)
            .field("charm-mod-version", a.charm_mod_version)
            .field("force-charm", a.force_charm)
            .field("exposed", a.exposed)
            .nonempty_values("exposed-endpoints", &exposed)
            .field("min-units", a.min_units)
            .nonempty("password-hash", &a.password_hash)
            .nonempty("placement", &a.placement)
            .field("has-resources", a.has_resources)
            .field("desired-scale", a.desired_scale)
            .opt_embedded("status", "status", self.status.as_ref())
            .field("status-history", self.status_history.to_wire())
            .field("settings", a.settings.clone())
            .nonempty("leader", &a.leader)
            .field("leadership-settings", a.leadership_settings.clone())
            .nonempty_values("storage-constraints", &storage)
            .nonempty_map("endpoint-bindings", &a.endpoint_bindings)
            .nonempty_map("annotations", &self.annotations)
            .opt_embedded("constraints", "constraints", self.constraints.as_ref())
            .opt_embedded("cloud-service", "service", self.cloud_service.as_ref())
            .opt_embedded("charm-origin", "charm-origin", self.charm_origin.as_ref())
            .opt_embedded(
                "charm-metadata",
                "charm-metadata",
                self.charm_metadata.as_ref(),
            )
            .opt_embedded(
                "charm-manifest",
                "charm-manifest",
                self.charm_manifest.as_ref(),
            )
            .opt_embedded("charm-config", "charm-config", self.charm_config.as_ref())
            .collection("units", &self.units);
        if !a.metrics_creds.is_empty() {
            builder = builder.field("metrics-creds", a.metrics_creds.clone());
        }
        if !self.offers.is_empty() {
            builder = builder.collection("offers", &self.offers);
        }
        builder.into_value()
    }
}

pub(crate) fn registries() -> Vec<&'static SchemaRegistry> {
    vec![&REGISTRY]
}

//! Runtime orchestrator and builder.

use std::sync::{Arc, PoisonError, RwLock};

use distribution_core::lookup::lookup;
use distribution_core::{
    ActorShadows, DistributeOptions, DistributionReport, DistributionTables, Distributor,
    FormId, FormOracle, LevelMultCache, NpcFlags, OutfitManager, RecordBuffer, RngOracle,
    RuleSet, SaveReader, SaveRecord, ScriptOverride, SharedRng,
};

use crate::config::RuntimeConfig;
use crate::error::{Result, RuntimeError};
use crate::events::HostEvent;
use crate::host::{Host, HostActor};
use crate::repository::{FileSaveRepository, SaveFile, SaveRepository};

/// Distribution state for one game session.
///
/// The runtime owns the tables and every manager. The host adapter forwards
/// its callbacks to [`Runtime::handle`] and saves or loads the managers'
/// records alongside its own save games.
pub struct Runtime {
    config: RuntimeConfig,
    forms: Arc<dyn FormOracle>,
    distributor: Distributor,
    outfits: OutfitManager,
    shadows: ActorShadows,
    level_cache: LevelMultCache,
    /// Player identity the level cache is currently keyed by.
    player: RwLock<Option<String>>,
    /// Slot storage used by [`save_slot`](Self::save_slot) and
    /// [`load_slot`](Self::load_slot).
    repository: Option<Arc<dyn SaveRepository>>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn distributor(&self) -> &Distributor {
        &self.distributor
    }

    pub fn outfits(&self) -> &OutfitManager {
        &self.outfits
    }

    pub fn shadows(&self) -> &ActorShadows {
        &self.shadows
    }

    pub fn level_cache(&self) -> &LevelMultCache {
        &self.level_cache
    }

    pub fn repository(&self) -> Option<&dyn SaveRepository> {
        self.repository.as_deref()
    }

    fn outfit_management(&self) -> bool {
        self.distributor.config().outfit_management
    }

    fn level_mult_redistribution(&self) -> bool {
        self.distributor.config().level_mult_redistribution
    }

    /// Dispatches one host event.
    pub fn handle(&self, event: HostEvent, host: &mut dyn Host) {
        tracing::trace!(?event, "host event");
        match event {
            HostEvent::ActorLoaded { actor } => self.on_actor_loaded(actor, host),
            HostEvent::Dying { actor } => self.on_death(actor, host, true),
            HostEvent::Died { actor } => self.on_death(actor, host, false),
            HostEvent::Resurrected { actor } => self.on_resurrected(actor, host),
            HostEvent::Reset { actor } => {
                self.outfits.on_reset(actor);
                self.shadows.forget(actor);
            }
            HostEvent::FormDeleted { form } => {
                self.outfits.on_actor_deleted(form);
                self.shadows.forget(form);
                self.level_cache.delete_npc(form);
            }
            HostEvent::OutfitSetByScript { npc, outfit } => {
                self.on_outfit_set_by_script(npc, outfit, host)
            }
            HostEvent::LevelUp => self.on_level_up(host),
            HostEvent::MenuClosed => self.on_menu_closed(host),
        }
    }

    /// Returns the player identity, adopting the host's on first use.
    fn player(&self, host: &dyn Host) -> String {
        let mut player = self.player.write().unwrap_or_else(PoisonError::into_inner);
        player.get_or_insert_with(|| host.player_id()).clone()
    }

    fn on_actor_loaded(&self, id: FormId, host: &mut dyn Host) {
        let player = self.player(host);
        let Some(actor) = host.actor(id) else {
            tracing::trace!(actor = %id, "loaded actor not found");
            return;
        };
        let mut npc = actor.snapshot();
        if npc.has_flag(NpcFlags::PLAYER) {
            return;
        }
        self.outfits
            .initialize_template(npc.npc, actor.outfit_actor().default_outfit());

        let options = if self.shadows.try_mark_distributed(id) {
            DistributeOptions::default()
        } else {
            DistributeOptions::outfits_only()
        };
        let report = self.distributor.distribute(&mut npc, actor.npc_host(), &options);
        self.request_outfit(actor, &report);

        if npc.is_pc_level_mult()
            && self.level_mult_redistribution()
            && let Some(report) = self.distributor.redistribute_on_level_up(
                &mut npc,
                actor.npc_host(),
                &self.level_cache,
                &player,
            )
        {
            self.request_outfit(actor, &report);
        }

        if self.outfit_management() {
            self.outfits.apply_worn_outfit(actor.outfit_actor(), false);
        }
    }

    /// Queues the outfit a pass picked as the actor's regular outfit.
    ///
    /// Returns true if an outfit was queued.
    fn request_outfit(&self, actor: &mut dyn HostActor, report: &DistributionReport) -> bool {
        if !self.outfit_management() {
            return false;
        }
        let Some(choice) = &report.outfit else {
            return false;
        };
        self.outfits.set_default_outfit(
            actor.outfit_actor(),
            Some(choice.outfit.clone()),
            choice.is_final,
        );
        true
    }

    fn on_death(&self, id: FormId, host: &mut dyn Host, is_dying: bool) {
        let Some(actor) = host.actor(id) else {
            return;
        };
        let mut npc = actor.snapshot();
        let report = self
            .distributor
            .distribute_on_death(&mut npc, actor.npc_host(), &self.shadows);

        if !self.outfit_management() {
            return;
        }
        if let Some(choice) = report.and_then(|report| report.outfit) {
            self.outfits
                .set_death_outfit(actor.outfit_actor(), Some(choice.outfit), choice.is_final);
        }
        self.outfits.apply_worn_outfit(actor.outfit_actor(), is_dying);
    }

    fn on_resurrected(&self, id: FormId, host: &mut dyn Host) {
        if !self.outfit_management() {
            return;
        }
        if let Some(actor) = host.actor(id) {
            self.outfits.on_resurrect(actor.outfit_actor());
        }
    }

    fn on_outfit_set_by_script(&self, npc: FormId, outfit: Option<FormId>, host: &mut dyn Host) {
        if self.outfits.on_outfit_set_by_script(npc, outfit) != ScriptOverride::Resumed {
            return;
        }
        for id in host.loaded_actors() {
            if let Some(actor) = host.actor(id)
                && actor.outfit_actor().npc_id() == npc
            {
                self.outfits.reapply_worn_outfit(actor.outfit_actor());
            }
        }
    }

    fn on_level_up(&self, host: &mut dyn Host) {
        if !self.level_mult_redistribution() {
            return;
        }
        let player = self.player(host);
        let mut redistributed = 0usize;
        for id in host.loaded_actors() {
            let Some(actor) = host.actor(id) else {
                continue;
            };
            let mut npc = actor.snapshot();
            if npc.has_flag(NpcFlags::PLAYER) || !npc.is_pc_level_mult() {
                continue;
            }
            let Some(report) = self.distributor.redistribute_on_level_up(
                &mut npc,
                actor.npc_host(),
                &self.level_cache,
                &player,
            ) else {
                continue;
            };
            redistributed += 1;
            // Without a new candidate, resolving would drop the worn outfit.
            if self.request_outfit(actor, &report) {
                self.outfits.apply_worn_outfit(actor.outfit_actor(), false);
            }
        }
        tracing::debug!(redistributed, "level-up redistribution");
    }

    fn on_menu_closed(&self, host: &mut dyn Host) {
        let current = host.player_id();
        let previous = {
            let mut player = self.player.write().unwrap_or_else(PoisonError::into_inner);
            player.replace(current.clone())
        };
        if let Some(previous) = previous
            && previous != current
        {
            tracing::info!(%previous, %current, "player identity changed");
            self.level_cache.remap_player_id(&previous, &current);
        }
        if self.distributor.config().log_statistics {
            self.distributor.log_statistics();
        }
    }

    /// Writes the managers' records.
    ///
    /// # Errors
    ///
    /// Propagates record codec failures.
    pub fn save_records(&self) -> Result<Vec<SaveRecord>> {
        let mut buffer = RecordBuffer::new();
        self.outfits.save(&mut buffer)?;
        self.shadows.save(&mut buffer)?;
        Ok(buffer.into_records())
    }

    /// Replaces the managers' state with the records in `buffer`.
    ///
    /// Records with an unknown tag or version are skipped with a warning.
    /// Managers without a record keep their current state.
    pub fn load_records(&self, mut buffer: RecordBuffer) {
        while let Some(header) = buffer.next_record() {
            let loaded = match header.tag {
                OutfitManager::TAG => {
                    self.outfits
                        .load(&mut buffer, header.version, self.forms.as_ref())
                }
                ActorShadows::TAG => self.shadows.load(&mut buffer, header.version),
                _ => {
                    tracing::warn!(
                        tag = %String::from_utf8_lossy(&header.tag),
                        "skipping unknown save record"
                    );
                    continue;
                }
            };
            if let Err(err) = loaded {
                tracing::warn!(%err, "skipping unreadable save record");
            }
        }
    }

    /// Saves the managers' records to `slot`.
    ///
    /// # Errors
    ///
    /// Propagates codec and repository failures.
    pub fn save(&self, repo: &dyn SaveRepository, slot: &str) -> Result<()> {
        let file = SaveFile::new(self.save_records()?);
        repo.save(slot, &file)?;
        tracing::info!(slot, worn = self.outfits.worn_count(), "saved distribution state");
        Ok(())
    }

    /// Loads the managers' records from `slot`.
    ///
    /// Returns false, leaving state untouched, if the slot does not exist.
    ///
    /// # Errors
    ///
    /// Propagates repository failures.
    pub fn load(&self, repo: &dyn SaveRepository, slot: &str) -> Result<bool> {
        let Some(file) = repo.load(slot)? else {
            tracing::debug!(slot, "no saved distribution state");
            return Ok(false);
        };
        self.load_records(RecordBuffer::from_records(file.records));
        tracing::info!(slot, worn = self.outfits.worn_count(), "loaded distribution state");
        Ok(true)
    }
}

impl Runtime {
    /// Saves to `slot` of the configured repository.
    ///
    /// # Errors
    ///
    /// Fails without a repository, or as [`save`](Self::save) does.
    pub fn save_slot(&self, slot: &str) -> Result<()> {
        let repo = self.repository().ok_or(RuntimeError::MissingRepository)?;
        self.save(repo, slot)
    }

    /// Loads `slot` of the configured repository.
    ///
    /// # Errors
    ///
    /// Fails without a repository, or as [`load`](Self::load) does.
    pub fn load_slot(&self, slot: &str) -> Result<bool> {
        let repo = self.repository().ok_or(RuntimeError::MissingRepository)?;
        self.load(repo, slot)
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("distributor", &self.distributor)
            .field("worn_outfits", &self.outfits.worn_count())
            .field("shadows", &self.shadows.len())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Runtime`].
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    forms: Option<Arc<dyn FormOracle>>,
    rules: Option<RuleSet>,
    tables: Option<DistributionTables>,
    rng: Option<Arc<dyn RngOracle>>,
    repository: Option<Arc<dyn SaveRepository>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            forms: None,
            rules: None,
            tables: None,
            rng: None,
            repository: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the form oracle (required)
    pub fn forms(mut self, forms: Arc<dyn FormOracle>) -> Self {
        self.forms = Some(forms);
        self
    }

    /// Raw rules, resolved against the form oracle at build time
    pub fn rules(mut self, rules: RuleSet) -> Self {
        self.rules = Some(rules);
        self
    }

    /// Already-built tables; take precedence over [`rules`](Self::rules)
    pub fn tables(mut self, tables: DistributionTables) -> Self {
        self.tables = Some(tables);
        self
    }

    /// Random stream for chance filters and counts (default: entropy-seeded)
    pub fn rng(mut self, rng: Arc<dyn RngOracle>) -> Self {
        self.rng = Some(rng);
        self
    }

    /// Slot storage; defaults to a [`FileSaveRepository`] in
    /// [`RuntimeConfig::save_dir`] when one is configured
    pub fn repository(mut self, repository: Arc<dyn SaveRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Build the runtime.
    ///
    /// Without tables or rules, and with `data_dir` configured, rules and
    /// settings are read from the data directory; its settings file replaces
    /// [`RuntimeConfig::distribution`].
    ///
    /// # Errors
    ///
    /// Fails without a form oracle, if content cannot be loaded, or if the
    /// save directory cannot be created.
    pub fn build(mut self) -> Result<Runtime> {
        let forms = self.forms.take().ok_or(RuntimeError::MissingForms)?;

        #[cfg(feature = "content")]
        if self.tables.is_none() && self.rules.is_none() {
            self.load_content()?;
        }

        let tables = match (self.tables, self.rules) {
            (Some(tables), _) => tables,
            (None, Some(rules)) => lookup(&rules, forms.as_ref()),
            (None, None) => {
                tracing::warn!("runtime built without distribution rules");
                DistributionTables::new()
            }
        };
        let rng = self
            .rng
            .unwrap_or_else(|| Arc::new(SharedRng::from_entropy()));
        let distributor = Distributor::new(Arc::new(tables), rng)
            .with_config(self.config.distribution.clone());

        let repository = match (self.repository, &self.config.save_dir) {
            (Some(repository), _) => Some(repository),
            (None, Some(dir)) => {
                tracing::debug!(dir = %dir.display(), "using file save repository");
                Some(Arc::new(FileSaveRepository::new(dir)?) as Arc<dyn SaveRepository>)
            }
            (None, None) => None,
        };

        Ok(Runtime {
            config: self.config,
            forms,
            distributor,
            outfits: OutfitManager::new(),
            shadows: ActorShadows::new(),
            level_cache: LevelMultCache::new(),
            player: RwLock::new(None),
            repository,
        })
    }

    #[cfg(feature = "content")]
    fn load_content(&mut self) -> Result<()> {
        use distribution_content::ContentFactory;

        let Some(data_dir) = &self.config.data_dir else {
            return Ok(());
        };
        let factory = ContentFactory::new(data_dir);
        self.config.distribution = factory
            .load_config()
            .map_err(|e| RuntimeError::Content(format!("{e:#}")))?;
        self.rules = Some(
            factory
                .load_rules()
                .map_err(|e| RuntimeError::Content(format!("{e:#}")))?,
        );
        Ok(())
    }
}

//! crates/laundry_core/src/store.rs
//!
//! The Inventory State Store: the single owner of the counter state.
//!
//! Every mutation runs to completion, then persists. Persisting writes the
//! whole state to local storage synchronously and hands a copy to the mirror
//! outbox, which delivers it to the server on its own time. A failed local
//! write is logged and the in-memory state is kept; the mirror never reports
//! back into the store.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::bag::next_bag_name;
use crate::domain::{BagArchiveEntry, LaundryState, ProductRecord, ScanRecord, DEFAULT_DESTINATION};
use crate::ports::{Clock, ConfirmationService, LocalStateStore, MirrorOutbox, RemoteStateService};
use crate::reconcile::{reconcile, RestoreSource};
use crate::registration::ProductForm;
use crate::scan_input::normalize;

//=========================================================================================
// Operation Outcomes and Errors
//=========================================================================================

/// Precondition failures the operator has to be told about.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Nenhuma tag escaneada.")]
    EmptyGroup,
    #[error("Nenhum item nesta sacola.")]
    EmptyBag,
}

/// Result of feeding one entry to [`InventoryStore::add_scan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Recorded. `needs_registration` asks the caller to open the
    /// registration flow for the tag once the new row has been shown.
    Accepted { rfid: String, needs_registration: bool },
    /// The tag is already in the active bag; nothing changed.
    Duplicate { rfid: String },
    /// Blank input.
    Ignored,
}

/// Result of [`InventoryStore::archive_active_bag`].
#[derive(Debug, Clone, PartialEq)]
pub enum ArchiveOutcome {
    Archived {
        name: String,
        item_count: usize,
        next_bag_name: String,
    },
    Cancelled,
}

/// Result of [`InventoryStore::add_brand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrandOutcome {
    Added,
    AlreadyExists,
    Empty,
}

//=========================================================================================
// The Store
//=========================================================================================

pub struct InventoryStore {
    state: LaundryState,
    local: Arc<dyn LocalStateStore>,
    mirror: Arc<dyn MirrorOutbox>,
    clock: Arc<dyn Clock>,
}

impl InventoryStore {
    /// Creates a store over an already-reconciled state and labels the
    /// active bag for today.
    pub fn new(
        state: LaundryState,
        local: Arc<dyn LocalStateStore>,
        mirror: Arc<dyn MirrorOutbox>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mut store = Self {
            state,
            local,
            mirror,
            clock,
        };
        store.relabel_active_bag();
        store
    }

    /// Loads the state at startup.
    ///
    /// Local storage is read first. Only when it holds no entry is the remote
    /// snapshot fetched; a failed fetch leaves the defaults in place. A local
    /// entry that cannot be read is logged and also leaves the defaults.
    pub async fn restore(
        local: Arc<dyn LocalStateStore>,
        remote: &dyn RemoteStateService,
        mirror: Arc<dyn MirrorOutbox>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let defaults = LaundryState::default();
        let (state, source) = match local.load() {
            Ok(Some(stored)) => reconcile(defaults, Some(stored), None),
            Ok(None) => {
                let remote_copy = match remote.fetch_snapshot().await {
                    Ok(snapshot) => snapshot,
                    Err(e) => {
                        warn!("Remote restore failed: {}", e);
                        None
                    }
                };
                reconcile(defaults, None, remote_copy)
            }
            Err(e) => {
                error!("Restore failed: {}", e);
                (defaults, RestoreSource::Defaults)
            }
        };

        info!(
            source = ?source,
            scans = state.scans.len(),
            products = state.products.len(),
            bags = state.bag_history.len(),
            "Laundry state restored"
        );
        Self::new(state, local, mirror, clock)
    }

    /// Read-only access for the projections.
    pub fn state(&self) -> &LaundryState {
        &self.state
    }

    //-------------------------------------------------------------------------------------
    // Scans
    //-------------------------------------------------------------------------------------

    /// Records a read of `raw`, newest first, in the active bag.
    ///
    /// A tag already present in the active bag is rejected. The same tag may
    /// appear again once its bag has been archived.
    pub fn add_scan(&mut self, raw: &str) -> ScanOutcome {
        let rfid = normalize(raw);
        if rfid.is_empty() {
            return ScanOutcome::Ignored;
        }
        if self.state.has_active_scan(&rfid) {
            warn!("Duplicate rejected: {}", rfid);
            return ScanOutcome::Duplicate { rfid };
        }
        self.relabel_if_idle();

        let scan = ScanRecord {
            rfid: rfid.clone(),
            timestamp: self.clock.now(),
            bag_label: self.state.active_bag_label().to_string(),
        };
        self.state.scans.insert(0, scan);
        self.persist();

        let needs_registration = !self.state.products.contains_key(&rfid);
        debug!(%rfid, needs_registration, "Scan accepted");
        ScanOutcome::Accepted {
            rfid,
            needs_registration,
        }
    }

    /// Removes the first active scan of `rfid` once the operator agrees.
    /// Returns whether anything was removed.
    pub fn remove_scan(&mut self, rfid: &str, confirm: &mut dyn ConfirmationService) -> bool {
        let Some(idx) = self.state.scans.iter().position(|s| s.rfid == rfid) else {
            return false;
        };
        if !confirm.confirm("Remover este scan?") {
            return false;
        }
        self.state.scans.remove(idx);
        self.persist();
        true
    }

    /// Empties the active list without archiving it. Registrations are kept.
    pub fn clear_active_bag(&mut self, confirm: &mut dyn ConfirmationService) -> bool {
        if !confirm.confirm("Limpar lista de leitura atual? (Isso não apaga o cadastro dos itens)")
        {
            return false;
        }
        self.state.scans.clear();
        self.persist();
        true
    }

    //-------------------------------------------------------------------------------------
    // Registration
    //-------------------------------------------------------------------------------------

    /// The registration form for `rfid`: its current record, or defaults.
    pub fn product_form_for(&self, rfid: &str) -> ProductForm {
        match self.state.products.get(rfid) {
            Some(record) => ProductForm::from_record(record),
            None => self.default_form(),
        }
    }

    /// A fresh form: first category, its first item, today, zero prices,
    /// house destination.
    pub fn default_form(&self) -> ProductForm {
        let category = self.categories().first().cloned().unwrap_or_default();
        let name = self.names_for(&category).first().cloned().unwrap_or_default();
        ProductForm {
            category,
            name,
            acquisition_date: self.clock.today().format("%Y-%m-%d").to_string(),
            wash_price: "0".into(),
            item_price: "0".into(),
            destination: DEFAULT_DESTINATION.to_string(),
            ..Default::default()
        }
    }

    /// Saves the registration of `rfid`, replacing any previous one whole.
    pub fn register_product(&mut self, rfid: &str, form: &ProductForm) -> &ProductRecord {
        let rfid = normalize(rfid);
        let record = form.to_record(&rfid, self.clock.today());
        self.remember_brand(&record.brand);
        self.state.products.insert(rfid.clone(), record);
        self.persist();
        info!(%rfid, "Product registered");
        &self.state.products[&rfid]
    }

    /// Applies one registration to every distinct tag in `rfids`.
    ///
    /// Existing registrations are overwritten without asking. Tags with no
    /// active scan get one, stamped now and placed in the active bag.
    /// Returns the number of distinct tags registered.
    pub fn register_group(&mut self, rfids: &[String], form: &ProductForm) -> Result<usize, StoreError> {
        let mut distinct: Vec<String> = Vec::with_capacity(rfids.len());
        for rfid in rfids.iter().map(|r| normalize(r)) {
            if !rfid.is_empty() && !distinct.contains(&rfid) {
                distinct.push(rfid);
            }
        }
        if distinct.is_empty() {
            return Err(StoreError::EmptyGroup);
        }

        self.relabel_if_idle();
        let today = self.clock.today();
        let now = self.clock.now();
        for rfid in &distinct {
            let record = form.to_record(rfid, today);
            self.state.products.insert(rfid.clone(), record);

            if !self.state.has_active_scan(rfid) {
                let scan = ScanRecord {
                    rfid: rfid.clone(),
                    timestamp: now,
                    bag_label: self.state.active_bag_label().to_string(),
                };
                self.state.scans.insert(0, scan);
            }
        }
        self.remember_brand(form.brand.trim());
        self.persist();

        info!(count = distinct.len(), "Group registered");
        Ok(distinct.len())
    }

    //-------------------------------------------------------------------------------------
    // Bags
    //-------------------------------------------------------------------------------------

    /// Closes the active bag into history and labels the next one.
    ///
    /// The bag is archived under the label its scans carry, even when the
    /// day has turned since it was opened.
    pub fn archive_active_bag(
        &mut self,
        confirm: &mut dyn ConfirmationService,
    ) -> Result<ArchiveOutcome, StoreError> {
        if self.state.scans.is_empty() {
            return Err(StoreError::EmptyBag);
        }
        let name = self.closing_name();
        if !confirm.confirm(&format!("Fechar sacola \"{}\" e arquivar itens?", name)) {
            return Ok(ArchiveOutcome::Cancelled);
        }

        let items = std::mem::take(&mut self.state.scans);
        let item_count = items.len();
        self.state.bag_history.push(BagArchiveEntry {
            name: name.clone(),
            archived_at: self.clock.now(),
            item_count,
            items,
        });
        self.relabel_active_bag();
        self.persist();

        info!(bag = %name, item_count, "Bag archived");
        Ok(ArchiveOutcome::Archived {
            name,
            item_count,
            next_bag_name: self.state.bag_name.clone(),
        })
    }

    /// The active bag label is always derived, never typed in.
    fn relabel_active_bag(&mut self) {
        self.state.bag_name = next_bag_name(self.clock.today(), &self.state.bag_history);
    }

    /// An empty bag follows the calendar; one holding scans keeps its label.
    fn relabel_if_idle(&mut self) {
        if self.state.scans.is_empty() {
            self.relabel_active_bag();
        }
    }

    fn closing_name(&self) -> String {
        let current = self.state.bag_name.as_str();
        if current.is_empty() || self.state.bag_history.iter().any(|b| b.name == current) {
            next_bag_name(self.clock.today(), &self.state.bag_history)
        } else {
            current.to_string()
        }
    }

    //-------------------------------------------------------------------------------------
    // Taxonomy
    //-------------------------------------------------------------------------------------

    /// Adds a brand unless blank or already known (exact match).
    pub fn add_brand(&mut self, name: &str) -> BrandOutcome {
        let name = name.trim();
        if name.is_empty() {
            return BrandOutcome::Empty;
        }
        if !self.remember_brand(name) {
            return BrandOutcome::AlreadyExists;
        }
        self.persist();
        BrandOutcome::Added
    }

    fn remember_brand(&mut self, brand: &str) -> bool {
        if brand.is_empty() || self.state.brands.iter().any(|b| b == brand) {
            return false;
        }
        self.state.brands.push(brand.to_string());
        self.state.brands.sort();
        true
    }

    pub fn categories(&self) -> Vec<String> {
        if self.state.categories.is_empty() {
            crate::domain::default_categories()
        } else {
            self.state.categories.clone()
        }
    }

    /// Item names offered for `category`; empty when the category has none.
    pub fn names_for(&self, category: &str) -> Vec<String> {
        let options = if self.state.category_options.is_empty() {
            crate::domain::default_category_options()
        } else {
            self.state.category_options.clone()
        };
        options.get(category).cloned().unwrap_or_default()
    }

    //-------------------------------------------------------------------------------------
    // Persistence
    //-------------------------------------------------------------------------------------

    fn persist(&self) {
        if let Err(e) = self.local.save(&self.state) {
            error!("Persist failed: {}", e);
        }
        let job_id = self.mirror.enqueue(self.state.clone());
        debug!(%job_id, "Mirror job queued");
    }
}

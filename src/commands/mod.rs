// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod appointments;
pub mod cash;
pub mod clients;
pub mod doctor;
pub mod exporter;
pub mod professionals;
pub mod reports;
pub mod services;
pub mod settings;

use std::collections::HashMap;

use anyhow::Result;

use crate::models::RecordId;
use crate::store::{EntityStore, SqliteStore};

/// Display names for a shop's records; joins happen here, not in the engine.
pub(crate) struct Directory {
    clients: HashMap<RecordId, String>,
    professionals: HashMap<RecordId, String>,
    services: HashMap<RecordId, String>,
}

impl Directory {
    pub(crate) fn load(store: &SqliteStore, shop: &str) -> Result<Self> {
        Ok(Directory {
            clients: store
                .list_clients(shop)?
                .into_iter()
                .map(|c| (c.id, c.name))
                .collect(),
            professionals: store
                .list_professionals(shop)?
                .into_iter()
                .map(|p| (p.id, p.name))
                .collect(),
            services: store
                .list_services(shop)?
                .into_iter()
                .map(|s| (s.id, s.name))
                .collect(),
        })
    }

    fn name(map: &HashMap<RecordId, String>, id: RecordId) -> String {
        map.get(&id).cloned().unwrap_or_else(|| format!("#{}", id))
    }

    pub(crate) fn client(&self, id: RecordId) -> String {
        Self::name(&self.clients, id)
    }

    pub(crate) fn professional(&self, id: RecordId) -> String {
        Self::name(&self.professionals, id)
    }

    pub(crate) fn service(&self, id: RecordId) -> String {
        Self::name(&self.services, id)
    }
}

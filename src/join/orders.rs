//! Current-order join: appointments → service appointments → services

use super::{ResourceJoiner, settle};
use crate::core::{Entity, EntityKind, ListFilter, ViewError};
use crate::entities::{Appointment, Service, ServiceAppointment};
use indexmap::IndexMap;
use serde::Serialize;

/// One service on an order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderLine {
    pub service_appointment_id: String,
    pub service_id: String,
    pub rating_id: Option<String>,
    /// `None` when the service could not be resolved
    pub service: Option<Service>,
}

impl OrderLine {
    pub fn is_resolved(&self) -> bool {
        self.service.is_some()
    }

    /// Price counted towards the order total; unresolved lines count as 0
    pub fn price(&self) -> f64 {
        self.service.as_ref().map_or(0.0, |service| service.price)
    }
}

/// An appointment with its service lines resolved
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinedOrder {
    pub appointment: Appointment,
    pub lines: Vec<OrderLine>,
    pub total_amount: f64,
    /// Shop of the first resolved service
    pub shop_id: Option<String>,
}

impl ResourceJoiner<'_> {
    /// Join a page of appointments with their services.
    ///
    /// The join table is read with a single list call for the whole page.
    /// Every distinct service id is resolved once, concurrently. Appointments
    /// without any resolvable service are left out of the result; input order
    /// is otherwise preserved.
    pub async fn join_orders(
        &self,
        appointments: Vec<Appointment>,
    ) -> Result<Vec<JoinedOrder>, ViewError> {
        if appointments.is_empty() {
            return Ok(Vec::new());
        }

        let by_appointment = self.service_appointments(&appointments).await?;

        let service_ids = appointments
            .iter()
            .filter_map(|appointment| by_appointment.get(&appointment.id))
            .flatten()
            .map(|row| row.service_id.as_str());
        let services = self
            .store
            .resolve_many_as::<Service, _, _>(service_ids)
            .await;

        let mut orders = Vec::with_capacity(appointments.len());
        for appointment in appointments {
            let Some(rows) = by_appointment.get(&appointment.id) else {
                tracing::debug!(
                    appointment = %appointment.id,
                    "no service appointments, dropping order"
                );
                continue;
            };

            let lines: Vec<OrderLine> = rows
                .iter()
                .map(|row| OrderLine {
                    service_appointment_id: row.id.clone(),
                    service_id: row.service_id.clone(),
                    rating_id: row.rating_id.clone(),
                    service: settle(services.get(&row.service_id), &appointment.id, "service"),
                })
                .collect();

            if !lines.iter().any(OrderLine::is_resolved) {
                tracing::debug!(
                    appointment = %appointment.id,
                    "no resolvable services, dropping order"
                );
                continue;
            }

            let total_amount = lines.iter().map(OrderLine::price).sum();
            let shop_id = lines
                .iter()
                .filter_map(|line| line.service.as_ref())
                .map(|service| service.shop_id.trim())
                .find(|id| !id.is_empty())
                .map(str::to_string);

            orders.push(JoinedOrder {
                appointment,
                lines,
                total_amount,
                shop_id,
            });
        }

        Ok(orders)
    }

    /// One list call for the page's join rows, grouped by appointment id
    async fn service_appointments(
        &self,
        appointments: &[Appointment],
    ) -> Result<IndexMap<String, Vec<ServiceAppointment>>, ViewError> {
        let kind = EntityKind::ServiceAppointment;
        let filter = ListFilter::new().any_of(
            "appointment_id",
            appointments.iter().map(|appointment| appointment.id.as_str()),
        );

        let records = self
            .repository
            .fetch_list(kind, &filter)
            .await
            .map_err(|e| ViewError::RootFetch {
                kind,
                message: e.to_string(),
            })?;

        let mut grouped: IndexMap<String, Vec<ServiceAppointment>> = IndexMap::new();
        for record in &records {
            match ServiceAppointment::from_record(record) {
                Ok(row) => grouped.entry(row.appointment_id.clone()).or_default().push(row),
                Err(e) => tracing::warn!(error = %e, "skipping malformed service appointment"),
            }
        }

        tracing::debug!(
            rows = records.len(),
            appointments = grouped.len(),
            "grouped service appointments"
        );
        Ok(grouped)
    }
}

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use supply_core::{CoreError, CoreResult};
use supply_shared::models::events::ResponseActionsGeneratedEvent;
use supply_shared::models::incident::{
    ActionPriority, ActionStatus, EventFilter, EventSpec, ResponseAction, TimelineEntry,
};
use supply_shared::{DomainEvent, EventStatus, EventType, SupplyChainEvent};
use uuid::Uuid;

use crate::context::EngineContext;

const ENTITY: &str = "supply_chain_event";

/// Checklist template: action, assignee, priority, time allowed
type ActionTemplate = (&'static str, &'static str, ActionPriority, Duration);

fn checklist(event_type: EventType) -> [ActionTemplate; 2] {
    use ActionPriority::*;
    match event_type {
        EventType::SupplierIssue => [
            ("Contact supplier to discuss performance issues", "procurement", High, Duration::days(1)),
            ("Review alternative suppliers", "sourcing", Medium, Duration::days(3)),
        ],
        EventType::DeliveryDelay => [
            ("Track shipment and confirm revised arrival", "logistics", High, Duration::hours(4)),
            ("Notify affected departments", "operations", Medium, Duration::hours(8)),
        ],
        EventType::QualityProblem => [
            ("Quarantine affected inventory", "quality", Critical, Duration::hours(4)),
            ("Issue corrective action request to supplier", "quality", High, Duration::days(2)),
        ],
        EventType::DemandSpike => [
            ("Review inventory positions for affected products", "planning", High, Duration::hours(4)),
            ("Expedite open purchase orders", "procurement", High, Duration::days(1)),
        ],
        EventType::CapacityConstraint => [
            ("Confirm available capacity with supplier", "procurement", High, Duration::days(1)),
            ("Reallocate volume to secondary suppliers", "sourcing", Medium, Duration::days(3)),
        ],
        EventType::NaturalDisaster => [
            ("Assess supplier site status and staff safety", "risk_management", Critical, Duration::hours(2)),
            ("Activate business continuity plan", "operations", Critical, Duration::days(1)),
        ],
        EventType::Geopolitical => [
            ("Assess exposure of affected regions", "risk_management", High, Duration::days(1)),
            ("Evaluate alternative sourcing regions", "sourcing", Medium, Duration::days(7)),
        ],
        EventType::PriceVolatility => [
            ("Review contract pricing terms", "procurement", Medium, Duration::days(2)),
            ("Evaluate hedging or forward buying", "finance", Medium, Duration::days(5)),
        ],
        EventType::RegulatoryChange => [
            ("Assess regulatory impact", "compliance", High, Duration::days(1)),
            ("Send stakeholder update", "compliance", Medium, Duration::days(2)),
        ],
    }
}

/// Response actions for an event type detected at `now`
pub fn response_plan(event_type: EventType, now: DateTime<Utc>) -> Vec<ResponseAction> {
    checklist(event_type)
        .into_iter()
        .map(|(action, assignee, priority, allowed)| ResponseAction {
            id: Uuid::new_v4(),
            action: action.to_string(),
            assignee: assignee.to_string(),
            priority,
            deadline: now + allowed,
            status: ActionStatus::Pending,
        })
        .collect()
}

/// Creates incident records and handles operator actions on them
pub struct EventCoordinator {
    ctx: Arc<EngineContext>,
}

impl EventCoordinator {
    pub fn new(ctx: Arc<EngineContext>) -> Self {
        Self { ctx }
    }

    pub fn get_event(&self, event_id: &Uuid) -> CoreResult<SupplyChainEvent> {
        self.ctx.registry.events.get(event_id)
    }

    pub fn list_events(&self, filter: &EventFilter) -> Vec<SupplyChainEvent> {
        self.ctx.registry.events.list(|event| filter.matches(event))
    }

    /// An unresolved event of `event_type` already names this supplier
    pub fn has_open_event(&self, event_type: EventType, supplier_id: &Uuid) -> bool {
        !self
            .ctx
            .registry
            .events
            .list(|event| {
                event.event_type == event_type
                    && event.status != EventStatus::Resolved
                    && event.affected_suppliers.contains(supplier_id)
            })
            .is_empty()
    }

    /// Record a detected incident and attach its response checklist
    pub fn raise(&self, spec: EventSpec) -> CoreResult<SupplyChainEvent> {
        let now = self.ctx.now();
        let event = SupplyChainEvent {
            id: Uuid::new_v4(),
            event_type: spec.event_type,
            severity: spec.severity,
            status: EventStatus::Active,
            timeline: vec![TimelineEntry {
                timestamp: now,
                title: "Event Detected".to_string(),
                description: spec.description.clone(),
            }],
            title: spec.title,
            description: spec.description,
            affected_suppliers: spec.affected_suppliers,
            affected_products: spec.affected_products,
            affected_orders: spec.affected_orders,
            impact: spec.impact,
            response_actions: Vec::new(),
            detected_at: now,
            resolved_at: None,
            escalated_to: None,
        };

        self.ctx.registry.events.insert(event.clone())?;
        tracing::info!(
            event_id = %event.id,
            event_type = %event.event_type,
            severity = ?event.severity,
            "Supply chain event created"
        );
        self.ctx.publish(DomainEvent::SupplyChainEventCreated(event.clone()));

        self.generate_response_actions(&event.id, event.event_type, now)
    }

    fn generate_response_actions(
        &self,
        event_id: &Uuid,
        event_type: EventType,
        now: DateTime<Utc>,
    ) -> CoreResult<SupplyChainEvent> {
        let actions = response_plan(event_type, now);
        let event = self.ctx.registry.events.update(event_id, |event| {
            event.response_actions.extend(actions.iter().cloned());
            Ok(event.clone())
        })?;

        tracing::debug!(event_id = %event_id, actions = actions.len(), "Response actions generated");
        self.ctx
            .publish(DomainEvent::ResponseActionsGenerated(ResponseActionsGeneratedEvent {
                event_id: *event_id,
                actions,
            }));
        Ok(event)
    }

    pub fn resolve(&self, event_id: &Uuid, resolution: &str) -> CoreResult<SupplyChainEvent> {
        let now = self.ctx.now();
        self.operate(event_id, EventStatus::Resolved, |event| {
            event.resolved_at = Some(now);
            TimelineEntry {
                timestamp: now,
                title: "Event Resolved".to_string(),
                description: resolution.to_string(),
            }
        })
    }

    pub fn escalate(&self, event_id: &Uuid, escalated_to: &str) -> CoreResult<SupplyChainEvent> {
        if escalated_to.trim().is_empty() {
            return Err(CoreError::validation("escalation target is required"));
        }
        let now = self.ctx.now();
        self.operate(event_id, EventStatus::Escalated, |event| {
            event.escalated_to = Some(escalated_to.to_string());
            TimelineEntry {
                timestamp: now,
                title: "Event Escalated".to_string(),
                description: format!("Escalated to {}", escalated_to),
            }
        })
    }

    pub fn monitor(&self, event_id: &Uuid) -> CoreResult<SupplyChainEvent> {
        let now = self.ctx.now();
        self.operate(event_id, EventStatus::Monitoring, |_| TimelineEntry {
            timestamp: now,
            title: "Under Monitoring".to_string(),
            description: "Event moved to monitoring".to_string(),
        })
    }

    /// Resolved events are closed to every further operator action
    fn operate(
        &self,
        event_id: &Uuid,
        status: EventStatus,
        apply: impl FnOnce(&mut SupplyChainEvent) -> TimelineEntry,
    ) -> CoreResult<SupplyChainEvent> {
        let event = self.ctx.registry.events.update(event_id, |event| {
            if !event.is_open() {
                return Err(CoreError::invalid_transition(ENTITY, event.status, status));
            }
            let entry = apply(event);
            event.status = status;
            event.timeline.push(entry);
            Ok(event.clone())
        })?;
        tracing::info!(event_id = %event_id, status = %status, "Supply chain event updated");
        Ok(event)
    }

    /// Move a checklist item forward: pending → in_progress → completed
    pub fn update_action(
        &self,
        event_id: &Uuid,
        action_id: &Uuid,
        status: ActionStatus,
    ) -> CoreResult<SupplyChainEvent> {
        let now = self.ctx.now();
        self.ctx.registry.events.update(event_id, |event| {
            let action = event
                .response_actions
                .iter_mut()
                .find(|a| a.id == *action_id)
                .ok_or_else(|| CoreError::not_found("response_action", action_id))?;

            let allowed = matches!(
                (action.status, status),
                (ActionStatus::Pending, ActionStatus::InProgress)
                    | (ActionStatus::Pending, ActionStatus::Completed)
                    | (ActionStatus::InProgress, ActionStatus::Completed)
            );
            if !allowed {
                return Err(CoreError::invalid_transition(
                    "response_action",
                    format!("{:?}", action.status),
                    format!("{:?}", status),
                ));
            }
            action.status = status;
            let entry = TimelineEntry {
                timestamp: now,
                title: "Action Updated".to_string(),
                description: format!("{} is now {:?}", action.action, status),
            };
            event.timeline.push(entry);
            Ok(event.clone())
        })
    }
}

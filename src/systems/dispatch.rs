use rand::Rng;
use tracing::{debug, warn};

use crate::{
    dispatch::{AgentStatus, FarmerAgent, PendingCollection},
    engine::{System, SystemContext},
    events::SimEvent,
    grid::Tile,
    inventory::Inventory,
    rng::SystemRng,
    world::SimulationState,
};

/// Moves farmer agents between houses and pending collections.
///
/// Each tick settles legs that have ended, resizes the roster to one agent
/// per house, hands open collections to idle agents oldest first, then drops
/// the collections that were committed.
pub struct DispatchSystem;

impl DispatchSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DispatchSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for DispatchSystem {
    fn name(&self) -> &str {
        "dispatch"
    }

    fn run(
        &mut self,
        ctx: &SystemContext<'_>,
        world: &mut SimulationState,
        rng: &mut SystemRng<'_>,
        events: &mut Vec<SimEvent>,
    ) {
        advance_agents(ctx, world, events);
        sync_roster(world);
        assign_idle(ctx, world, rng);
        world.pending.retain(|collection| !collection.collected);
    }
}

fn advance_agents(ctx: &SystemContext<'_>, world: &mut SimulationState, events: &mut Vec<SimEvent>) {
    let SimulationState {
        agents,
        pending,
        inventory,
        ..
    } = world;

    for agent in agents.iter_mut() {
        // A short outbound leg and its return can both finish inside one tick.
        loop {
            if agent.is_idle() || !agent.has_arrived(ctx.now, ctx.config.arrival_radius) {
                break;
            }
            match agent.status {
                AgentStatus::Traveling => {
                    if let Some(id) = agent.assigned_collection {
                        if let Some(collection) = pending.iter_mut().find(|c| c.id == id) {
                            events.push(commit(agent, collection, inventory));
                        } else {
                            warn!(agent = agent.id, collection = id, "collection vanished");
                        }
                    }
                    let started_at = agent.leg_ends_at().min(ctx.now);
                    agent.begin_return(started_at, ctx.config.return_trip_ms);
                }
                AgentStatus::Returning => agent.settle(),
                AgentStatus::Idle => break,
            }
        }
    }
}

/// Autonomous pickups are credited even past capacity; the overflow is
/// flagged on the event instead.
fn commit(
    agent: &FarmerAgent,
    collection: &mut PendingCollection,
    inventory: &mut Inventory,
) -> SimEvent {
    inventory.force_add(collection.resource, collection.amount);
    collection.collected = true;
    let overflow = inventory.is_over_capacity();
    debug!(
        agent = agent.id,
        collection = collection.id,
        resource = %collection.resource,
        amount = collection.amount,
        overflow,
        "collection committed"
    );
    SimEvent::CollectionCommitted {
        collection: collection.id,
        agent: agent.id,
        resource: collection.resource,
        amount: collection.amount,
        overflow,
    }
}

/// One agent per house. The roster only grows or shrinks at its tail, and a
/// busy tail agent is kept until it comes home.
fn sync_roster(world: &mut SimulationState) {
    let homes: Vec<Tile> = world.houses().map(|house| house.origin).collect();

    while world.agents.len() < homes.len() {
        let home = homes[world.agents.len()];
        let id = world.allocate_agent();
        debug!(agent = id, x = home.x, z = home.z, "agent hired");
        world.agents.push(FarmerAgent::new(id, home));
    }
    while world.agents.len() > homes.len() {
        match world.agents.last() {
            Some(agent) if agent.is_idle() => {
                debug!(agent = agent.id, "agent released");
                world.agents.pop();
            }
            _ => break,
        }
    }

    for (agent, home) in world.agents.iter_mut().zip(homes) {
        if agent.is_idle() && agent.home != home {
            agent.home = home;
            agent.settle();
        }
    }
}

fn assign_idle(ctx: &SystemContext<'_>, world: &mut SimulationState, rng: &mut SystemRng<'_>) {
    let mut open: Vec<usize> = world
        .pending
        .iter()
        .enumerate()
        .filter(|(_, collection)| collection.is_open())
        .map(|(index, _)| index)
        .collect();
    if open.is_empty() {
        return;
    }
    open.sort_by_key(|&index| (world.pending[index].produced_at, world.pending[index].id));

    let low = ctx.config.travel_min_ms;
    let high = ctx.config.travel_max_ms.max(low);
    let mut queue = open.into_iter();

    for agent in world.agents.iter_mut().filter(|agent| agent.is_idle()) {
        let Some(index) = queue.next() else {
            break;
        };
        let collection = &mut world.pending[index];
        let target = world
            .grid
            .nearest_free(collection.source, ctx.config.nudge_radius)
            .unwrap_or(collection.source);
        let duration = rng.gen_range(low..=high);
        collection.assigned_agent = Some(agent.id);
        agent.begin_trip(collection.id, target, ctx.now, duration);
        debug!(
            agent = agent.id,
            collection = collection.id,
            duration,
            "agent dispatched"
        );
    }
}

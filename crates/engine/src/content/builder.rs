use super::event::{Event, EventListId};
use super::graph::{GraphError, Scene, SceneGraph, Script, VariableDecl};
use super::value::Value;

/// Assembles a [`SceneGraph`] in code, handing out arena handles for event
/// lists as they are added.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: SceneGraph,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `events` and returns its handle. Empty lists share the reserved
    /// empty handle.
    pub fn list(&mut self, events: Vec<Event>) -> EventListId {
        if events.is_empty() {
            return EventListId::EMPTY;
        }
        let id = EventListId(self.graph.event_lists.len() as u32);
        self.graph.event_lists.push(events);
        id
    }

    pub fn variable(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.graph.variables.push(VariableDecl {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn scene(&mut self, scene: Scene) -> &mut Self {
        self.graph.scenes.push(scene);
        self
    }

    pub fn script(&mut self, name: impl Into<String>, events: EventListId) -> &mut Self {
        self.graph.scripts.push(Script {
            id: String::new(),
            name: name.into(),
            events,
        });
        self
    }

    pub fn starting_scene(&mut self, name: impl Into<String>) -> &mut Self {
        self.graph.starting_scene = Some(name.into());
        self
    }

    pub fn build(self) -> Result<SceneGraph, GraphError> {
        self.graph.validate()?;
        Ok(self.graph)
    }
}

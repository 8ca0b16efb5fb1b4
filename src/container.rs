//! Container hierarchy and the dispatch core.
//!
//! A [`Container`] owns named [`SoundEntry`] values and refers to child containers. Every
//! operation goes through one dispatch routine: an index target is handled by the container
//! itself, a name target is resolved depth-first by [`ContainerTree::dispatch`].
//!
//! # Name resolution
//!
//! 1. The container's own entries are scanned in storage order; the first name match handles
//!    the operation and the subtree is never searched, whatever the outcome.
//! 2. Without a local match and with `search_nested` off, the lookup fails.
//! 3. Otherwise children are tried in storage order with
//!    `search_nested = !only_direct, only_direct = false`. The first child that succeeds ends
//!    the search.
//!
//! With the default flags a caller therefore searches itself and the own entries of its direct
//! children. Calling with `only_direct = false` searches the whole subtree.

use crate::audibility;
use crate::backend::VoiceBackend;
use crate::config::SoundEntryDesc;
use crate::entry::SoundEntry;
use crate::error::{AudioNestError, Result};
use crate::events::{AudioNestEvent, DestroyReason};
use crate::keys::{KeyGenerator, VoiceKey};
use crate::math::Vec3;
use crate::playback::{Operation, Outcome, StopMode, VoiceState};
use crate::scene::{NodeId, SceneGraph};
use crate::scheduler::{ScheduledTask, SchedulerHandle, TaskAction};
use crossbeam_channel::Sender;
use std::collections::HashMap;

/// Lightweight handle for a container inside a [`ContainerTree`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(usize);

impl ContainerId {
    pub fn from_index(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for ContainerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ContainerId({})", self.0)
    }
}

/// Search flags for name-addressed operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Search child containers when the name is not found locally
    pub search_nested: bool,
    /// Limit nested search to the own entries of direct children
    pub only_direct: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            search_nested: true,
            only_direct: true,
        }
    }
}

impl SearchOptions {
    /// Only the addressed container's own entries.
    pub fn local_only() -> Self {
        Self {
            search_nested: false,
            only_direct: true,
        }
    }

    /// The whole subtree.
    pub fn exhaustive() -> Self {
        Self {
            search_nested: true,
            only_direct: false,
        }
    }

    /// Flags each child is searched with.
    pub fn for_children(&self) -> Self {
        Self {
            search_nested: !self.only_direct,
            only_direct: false,
        }
    }
}

/// How an operation addresses an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'a> {
    /// Position in the container's own entry list
    Index(usize),
    /// Entry name, resolved through the hierarchy
    Name(&'a str),
}

/// Construction parameters for a [`Container`].
#[derive(Debug, Clone)]
pub struct ContainerDesc {
    pub name: String,
    /// May claim child containers at initialization
    pub accommodating: bool,
    /// May be claimed as a child
    pub nestable: bool,
    pub position: Vec3,
    pub entries: Vec<SoundEntryDesc>,
}

impl ContainerDesc {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            accommodating: true,
            nestable: true,
            position: Vec3::ZERO,
            entries: Vec::new(),
        }
    }

    pub fn accommodating(mut self, accommodating: bool) -> Self {
        self.accommodating = accommodating;
        self
    }

    pub fn nestable(mut self, nestable: bool) -> Self {
        self.nestable = nestable;
        self
    }

    pub fn position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn entry(mut self, entry: SoundEntryDesc) -> Self {
        self.entries.push(entry);
        self
    }
}

/// Node of the hierarchy.
#[derive(Debug)]
pub struct Container {
    id: ContainerId,
    node: NodeId,
    name: String,
    accommodating: bool,
    nestable: bool,
    position: Vec3,
    entries: Vec<SoundEntry>,
    children: Vec<ContainerId>,
}

impl Container {
    pub fn id(&self) -> ContainerId {
        self.id
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_accommodating(&self) -> bool {
        self.accommodating
    }

    pub fn is_nestable(&self) -> bool {
        self.nestable
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn entries(&self) -> &[SoundEntry] {
        &self.entries
    }

    pub fn entry(&self, index: usize) -> Option<&SoundEntry> {
        self.entries.get(index)
    }

    /// Child containers in search order.
    pub fn children(&self) -> &[ContainerId] {
        &self.children
    }

    /// Index of the first entry called `name`.
    pub fn entry_index(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name() == name)
    }
}

/// Collaborators an operation needs while it runs.
pub(crate) struct DispatchContext<'a> {
    pub backend: &'a mut dyn VoiceBackend,
    pub keys: &'a mut dyn KeyGenerator,
    pub scheduler: &'a SchedulerHandle,
    pub events: &'a Sender<AudioNestEvent>,
    pub now: f64,
}

impl DispatchContext<'_> {
    fn emit(&self, event: AudioNestEvent) {
        if let Err(e) = self.events.try_send(event) {
            log::trace!("Dropping event {:?}", e.into_inner());
        }
    }
}

/// Arena owning every container of a hierarchy.
#[derive(Debug, Default)]
pub struct ContainerTree {
    containers: Vec<Container>,
    by_node: HashMap<NodeId, ContainerId>,
}

impl ContainerTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a container attached to scene node `node`. Children are claimed later by
    /// [`initialize`](Self::initialize).
    pub fn insert(&mut self, node: NodeId, desc: ContainerDesc) -> Result<ContainerId> {
        if self.by_node.contains_key(&node) {
            return Err(AudioNestError::Configuration(format!(
                "Node {} already holds a container",
                node
            )));
        }

        let entries = desc
            .entries
            .into_iter()
            .map(SoundEntry::new)
            .collect::<Result<Vec<_>>>()?;

        let id = ContainerId(self.containers.len());
        self.containers.push(Container {
            id,
            node,
            name: desc.name,
            accommodating: desc.accommodating,
            nestable: desc.nestable,
            position: desc.position,
            entries,
            children: Vec::new(),
        });
        self.by_node.insert(node, id);
        Ok(id)
    }

    pub fn get(&self, id: ContainerId) -> Option<&Container> {
        self.containers.get(id.0)
    }

    pub fn container_for(&self, node: NodeId) -> Option<ContainerId> {
        self.by_node.get(&node).copied()
    }

    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Container> {
        self.containers.iter()
    }

    /// Containers no other container has claimed.
    pub fn roots(&self) -> Vec<ContainerId> {
        let claimed: Vec<ContainerId> = self
            .containers
            .iter()
            .flat_map(|c| c.children.iter().copied())
            .collect();
        self.containers
            .iter()
            .map(|c| c.id)
            .filter(|id| !claimed.contains(id))
            .collect()
    }

    pub fn set_position(&mut self, id: ContainerId, position: Vec3) -> Result<()> {
        let container = self
            .containers
            .get_mut(id.0)
            .ok_or(AudioNestError::UnknownContainer(id))?;
        container.position = position;
        Ok(())
    }

    /// Claims the direct, nestable child containers of `id` from the scene graph.
    ///
    /// Only the flags and scene nodes of other containers are read, so containers can be
    /// initialized in any order. Non-accommodating containers end up with no children.
    pub fn initialize(&mut self, id: ContainerId, scene: &dyn SceneGraph) -> Result<()> {
        let container = self.get(id).ok_or(AudioNestError::UnknownContainer(id))?;
        let node = container.node;

        let children: Vec<ContainerId> = if container.accommodating {
            scene
                .descendants(node)
                .into_iter()
                .filter_map(|n| self.by_node.get(&n).copied())
                .filter(|child| *child != id)
                .filter(|child| {
                    let candidate = &self.containers[child.0];
                    candidate.nestable && scene.parent(candidate.node) == Some(node)
                })
                .collect()
        } else {
            Vec::new()
        };

        log::debug!(
            "Container '{}' claimed {} child container(s)",
            self.containers[id.0].name,
            children.len()
        );
        self.containers[id.0].children = children;
        Ok(())
    }

    /// Initializes every container.
    pub fn initialize_all(&mut self, scene: &dyn SceneGraph) -> Result<()> {
        for index in 0..self.containers.len() {
            self.initialize(ContainerId(index), scene)?;
        }
        Ok(())
    }

    /// Runs `op` against `target`, starting at container `id`.
    pub(crate) fn dispatch(
        &mut self,
        id: ContainerId,
        target: Target<'_>,
        op: Operation,
        search: SearchOptions,
        cx: &mut DispatchContext<'_>,
    ) -> Result<Outcome> {
        let name = match target {
            Target::Index(index) => return self.dispatch_local(id, index, op, cx),
            Target::Name(name) => name,
        };

        let (local, children) = {
            let container = self.get(id).ok_or(AudioNestError::UnknownContainer(id))?;
            (container.entry_index(name), container.children.clone())
        };

        if let Some(index) = local {
            return self.dispatch_local(id, index, op, cx);
        }

        if !search.search_nested {
            return Err(AudioNestError::NotFound {
                name: name.to_string(),
            });
        }

        let nested = search.for_children();
        let mut first_failure = None;
        for child in children {
            match self.dispatch(child, target, op, nested, cx) {
                Ok(outcome) => return Ok(outcome),
                Err(e) if e.is_not_found() => {}
                Err(e) => {
                    log::debug!("'{}' failed in {}: {}", name, child, e);
                    first_failure.get_or_insert(e);
                }
            }
        }

        Err(first_failure.unwrap_or_else(|| AudioNestError::NotFound {
            name: name.to_string(),
        }))
    }

    fn dispatch_local(
        &mut self,
        id: ContainerId,
        index: usize,
        op: Operation,
        cx: &mut DispatchContext<'_>,
    ) -> Result<Outcome> {
        let Container { name, entries, .. } = self
            .containers
            .get_mut(id.0)
            .ok_or(AudioNestError::UnknownContainer(id))?;
        let len = entries.len();
        let entry = entries
            .get_mut(index)
            .ok_or_else(|| AudioNestError::InvalidIndex {
                container: name.clone(),
                index,
                len,
            })?;

        match op {
            Operation::Play(request) => {
                let start = request.playback_start(entry.desc());
                let key = entry.spawn_voice(cx.backend, cx.keys, id, start, cx.now)?;

                let clip_length = cx.backend.clip_length(entry.desc());
                if let Some(lifetime) = request.lifetime(entry.desc(), clip_length) {
                    cx.scheduler.after(
                        lifetime,
                        ScheduledTask {
                            container: id,
                            entry: index,
                            voice: key,
                            action: TaskAction::DestroyVoice(DestroyReason::Expired),
                        },
                    );
                }

                cx.emit(AudioNestEvent::VoiceStarted {
                    key,
                    container: id,
                    entry: entry.name().to_string(),
                    delay: start.delay(),
                });
                Ok(Outcome::Played(key))
            }
            Operation::Stop { mode, key } => {
                if !entry.contains_voice(key) {
                    return Err(AudioNestError::StaleKey { key });
                }

                let remaining = match mode {
                    StopMode::Instant => {
                        entry.destroy_voice(cx.backend, key);
                        cx.emit(AudioNestEvent::VoiceDestroyed {
                            key,
                            container: id,
                            reason: DestroyReason::StoppedInstantly,
                        });
                        return Ok(Outcome::Stopped(key));
                    }
                    StopMode::Delayed(delay) => delay,
                    StopMode::Natural => {
                        let clip_length = cx.backend.clip_length(entry.desc());
                        let position = entry
                            .voice(key)
                            .map(|v| v.playback_position(cx.now, clip_length))
                            .unwrap_or(0.0);
                        clip_length - position
                    }
                };

                let scheduled = cx.scheduler.after(
                    remaining,
                    ScheduledTask {
                        container: id,
                        entry: index,
                        voice: key,
                        action: TaskAction::DestroyVoice(DestroyReason::Stopped),
                    },
                );

                // a voice that is already stopping keeps the extra task but is announced once
                let newly_stopping = scheduled
                    && entry.voice_mut(key).is_some_and(|voice| {
                        let was_playing = voice.state() == VoiceState::Playing;
                        voice.mark_stopping();
                        was_playing
                    });
                if newly_stopping {
                    cx.emit(AudioNestEvent::VoiceStopping {
                        key,
                        container: id,
                        remaining,
                    });
                }
                Ok(Outcome::Stopped(key))
            }
        }
    }

    /// Applies a fired scheduler task. Returns whether a voice was destroyed; tasks for voices
    /// that are already gone are no-ops.
    pub(crate) fn apply_task(&mut self, task: &ScheduledTask, cx: &mut DispatchContext<'_>) -> bool {
        let Some(entry) = self
            .containers
            .get_mut(task.container.0)
            .and_then(|c| c.entries.get_mut(task.entry))
        else {
            return false;
        };

        match task.action {
            TaskAction::DestroyVoice(reason) => {
                if entry.destroy_voice(cx.backend, task.voice).is_none() {
                    log::trace!("Voice {} already destroyed", task.voice);
                    return false;
                }
                cx.emit(AudioNestEvent::VoiceDestroyed {
                    key: task.voice,
                    container: task.container,
                    reason,
                });
                true
            }
        }
    }

    /// Destroys every live voice in the tree.
    pub(crate) fn destroy_all_voices(&mut self, cx: &mut DispatchContext<'_>) -> usize {
        let mut count = 0;
        for container in &mut self.containers {
            for entry in &mut container.entries {
                for key in entry.destroy_all(cx.backend) {
                    cx.emit(AudioNestEvent::VoiceDestroyed {
                        key,
                        container: container.id,
                        reason: DestroyReason::StoppedInstantly,
                    });
                    count += 1;
                }
            }
        }
        count
    }

    /// Container and entry index owning the live voice `key`.
    pub fn find_voice(&self, key: VoiceKey) -> Option<(ContainerId, usize)> {
        self.containers.iter().find_map(|c| {
            c.entries
                .iter()
                .position(|e| e.contains_voice(key))
                .map(|index| (c.id, index))
        })
    }

    /// Loudest detection value of the subtree at `id`, every entry evaluated at `source`.
    pub fn audibility(
        &self,
        id: ContainerId,
        source: Vec3,
        listener: Vec3,
        search: SearchOptions,
    ) -> f32 {
        let Some(container) = self.get(id) else {
            return 0.0;
        };

        let own = audibility::loudest(
            container
                .entries
                .iter()
                .map(|e| e.audibility(source, listener)),
        );
        if !search.search_nested {
            return own;
        }

        let nested = search.for_children();
        audibility::loudest(
            std::iter::once(own).chain(
                container
                    .children
                    .iter()
                    .map(|child| self.audibility(*child, source, listener, nested)),
            ),
        )
    }

    /// Loudest detection value of the subtree at `id`, using container positions as sources.
    ///
    /// With `attention_to_child_position` each child is evaluated from its own position,
    /// otherwise the whole subtree is evaluated from the position of `id`.
    pub fn audibility_from_positions(
        &self,
        id: ContainerId,
        listener: Vec3,
        attention_to_child_position: bool,
        search: SearchOptions,
    ) -> f32 {
        let Some(container) = self.get(id) else {
            return 0.0;
        };

        let own = audibility::loudest(
            container
                .entries
                .iter()
                .map(|e| e.audibility(container.position, listener)),
        );
        if !search.search_nested {
            return own;
        }

        let nested = search.for_children();
        audibility::loudest(std::iter::once(own).chain(container.children.iter().map(
            |child| {
                if attention_to_child_position {
                    self.audibility_from_positions(*child, listener, true, nested)
                } else {
                    self.audibility(*child, container.position, listener, nested)
                }
            },
        )))
    }
}

use crate::backend::{HeadlessBackend, VoiceBackend};
use crate::config::AudioNestDesc;
use crate::container::{
    Container, ContainerDesc, ContainerId, ContainerTree, DispatchContext, SearchOptions, Target,
};
use crate::error::Result;
use crate::events::AudioNestEvent;
use crate::keys::{KeyGenerator, RandomKeys, VoiceKey};
use crate::math::Vec3;
use crate::playback::{Operation, Outcome, PlayRequest, StopMode, Voice, VoiceState};
use crate::scene::{NodeId, SceneGraph};
use crate::scheduler::{Scheduler, SchedulerHandle};
use crossbeam_channel::{Receiver, Sender};

/// Main world object that owns a container hierarchy and drives its voices.
///
/// `AudioNestWorld` is the central API of AudioNest. Containers are added against nodes of an
/// external scene graph, claimed into a hierarchy by [`initialize`](Self::initialize), and then
/// addressed by the play, stop and audibility facades below.
///
/// # Time
///
/// The world never reads a wall clock. Call [`update`](Self::update) once per frame with the
/// elapsed time; delayed destruction and scheduled stops fire from there.
///
/// # Failures
///
/// The facades report failure through `None`, `false` or `0.0` and log the reason at debug
/// level. Use [`dispatch`](Self::dispatch) to get the
/// [`AudioNestError`](crate::error::AudioNestError) instead.
pub struct AudioNestWorld<B: VoiceBackend = HeadlessBackend> {
    desc: AudioNestDesc,
    tree: ContainerTree,
    backend: B,
    scheduler: Scheduler,
    scheduler_handle: SchedulerHandle,
    keys: Box<dyn KeyGenerator>,
    event_sender: Sender<AudioNestEvent>,
    event_receiver: Receiver<AudioNestEvent>,
}

impl AudioNestWorld<HeadlessBackend> {
    /// Creates a world with a [`HeadlessBackend`].
    pub fn new(desc: AudioNestDesc) -> Self {
        Self::with_backend(desc, HeadlessBackend::new())
    }
}

impl<B: VoiceBackend> AudioNestWorld<B> {
    pub fn with_backend(desc: AudioNestDesc, backend: B) -> Self {
        let scheduler = Scheduler::new();
        let scheduler_handle = scheduler.handle();
        let (event_sender, event_receiver) = crossbeam_channel::bounded(desc.event_capacity);
        Self {
            desc,
            tree: ContainerTree::new(),
            backend,
            scheduler,
            scheduler_handle,
            keys: Box::new(RandomKeys),
            event_sender,
            event_receiver,
        }
    }

    /// Replaces the key generator, e.g. with [`SequentialKeys`](crate::keys::SequentialKeys)
    /// for reproducible runs.
    pub fn with_keys(mut self, keys: impl KeyGenerator + 'static) -> Self {
        self.keys = Box::new(keys);
        self
    }

    pub fn desc(&self) -> &AudioNestDesc {
        &self.desc
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn tree(&self) -> &ContainerTree {
        &self.tree
    }

    pub fn container(&self, id: ContainerId) -> Option<&Container> {
        self.tree.get(id)
    }

    /// Current clock value in seconds.
    pub fn now(&self) -> f64 {
        self.scheduler.now()
    }

    /// Number of scheduled destructions that have not fired yet.
    pub fn pending_tasks(&self) -> usize {
        self.scheduler.pending_count()
    }

    /// Adds a container attached to scene node `node`.
    ///
    /// Every entry of `desc` is validated; an invalid entry rejects the whole container.
    pub fn add_container(&mut self, node: NodeId, desc: ContainerDesc) -> Result<ContainerId> {
        let name = desc.name.clone();
        let id = self.tree.insert(node, desc).inspect_err(|e| {
            log::warn!("Container '{}' rejected: {}", name, e);
        })?;
        log::debug!("Added container '{}' as {} on {}", name, id, node);
        Ok(id)
    }

    /// Builds the hierarchy from the scene graph. Call once after every container has been
    /// added.
    pub fn initialize(&mut self, scene: &dyn SceneGraph) -> Result<()> {
        self.tree.initialize_all(scene)
    }

    /// Re-claims the children of a single container.
    pub fn initialize_container(&mut self, id: ContainerId, scene: &dyn SceneGraph) -> Result<()> {
        self.tree.initialize(id, scene)
    }

    pub fn set_container_position(&mut self, id: ContainerId, position: Vec3) -> Result<()> {
        self.tree.set_position(id, position)
    }

    /// Advances the clock by `dt` seconds and applies every task that came due.
    ///
    /// Returns the number of voices destroyed.
    pub fn update(&mut self, dt: f64) -> usize {
        let fired = self.scheduler.advance(dt);
        if fired.is_empty() {
            return 0;
        }
        self.with_context(|tree, cx| fired.iter().filter(|t| tree.apply_task(t, cx)).count())
    }

    /// Drains the events produced since the last call.
    ///
    /// At most [`AudioNestDesc::event_capacity`] events are kept between calls.
    pub fn poll_events(&mut self) -> Vec<AudioNestEvent> {
        self.event_receiver.try_iter().collect()
    }

    /// Number of events waiting to be polled.
    pub fn queued_events(&self) -> usize {
        self.event_receiver.len()
    }

    /// Runs `op` against `target` starting at `container`.
    ///
    /// # Arguments
    ///
    /// * `container` - Container the operation is addressed to
    /// * `target` - Entry index in that container, or a name resolved through the hierarchy
    /// * `op` - The play or stop operation
    /// * `search` - Search flags for name targets; ignored for index targets
    pub fn dispatch(
        &mut self,
        container: ContainerId,
        target: Target<'_>,
        op: Operation,
        search: SearchOptions,
    ) -> Result<Outcome> {
        self.with_context(|tree, cx| tree.dispatch(container, target, op, search, cx))
    }

    fn with_context<R>(
        &mut self,
        f: impl FnOnce(&mut ContainerTree, &mut DispatchContext<'_>) -> R,
    ) -> R {
        let mut cx = DispatchContext {
            backend: &mut self.backend,
            keys: self.keys.as_mut(),
            scheduler: &self.scheduler_handle,
            events: &self.event_sender,
            now: self.scheduler.now(),
        };
        f(&mut self.tree, &mut cx)
    }

    fn collapse(
        &mut self,
        container: ContainerId,
        target: Target<'_>,
        op: Operation,
        search: SearchOptions,
    ) -> Option<Outcome> {
        match self.dispatch(container, target, op, search) {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                log::debug!(
                    "{:?} of {:?} in '{}' failed: {}",
                    op,
                    target,
                    container_label(&self.tree, container),
                    e
                );
                None
            }
        }
    }

    /// Plays `target` with an explicit request, returning the new voice's key.
    pub fn play_request(
        &mut self,
        container: ContainerId,
        target: Target<'_>,
        request: PlayRequest,
        search: SearchOptions,
    ) -> Option<VoiceKey> {
        self.collapse(container, target, Operation::Play(request), search)
            .map(|outcome| outcome.key())
    }

    /// Plays the entry at `index` of `container`'s own entry list.
    pub fn play_at_index(
        &mut self,
        container: ContainerId,
        index: usize,
        request: PlayRequest,
    ) -> Option<VoiceKey> {
        self.play_request(container, Target::Index(index), request, SearchOptions::local_only())
    }

    /// Plays `name` with its configured delay.
    pub fn play(&mut self, container: ContainerId, name: &str) -> Option<VoiceKey> {
        self.play_with(container, name, self.desc.default_search)
    }

    pub fn play_with(
        &mut self,
        container: ContainerId,
        name: &str,
        search: SearchOptions,
    ) -> Option<VoiceKey> {
        self.play_request(container, Target::Name(name), PlayRequest::configured(), search)
    }

    /// Plays `name` right away, ignoring its configured delay.
    pub fn play_instant(&mut self, container: ContainerId, name: &str) -> Option<VoiceKey> {
        let search = self.desc.default_search;
        self.play_request(container, Target::Name(name), PlayRequest::instant(), search)
    }

    /// Plays `name` after `delay` seconds instead of its configured delay.
    pub fn play_delayed(
        &mut self,
        container: ContainerId,
        name: &str,
        delay: f32,
    ) -> Option<VoiceKey> {
        let search = self.desc.default_search;
        self.play_request(container, Target::Name(name), PlayRequest::delayed(delay), search)
    }

    /// Plays `name` for at most `play_time` seconds (never longer than its clip).
    pub fn play_for(
        &mut self,
        container: ContainerId,
        name: &str,
        play_time: f32,
    ) -> Option<VoiceKey> {
        let search = self.desc.default_search;
        let request = PlayRequest::configured().with_play_time(play_time);
        self.play_request(container, Target::Name(name), request, search)
    }

    pub fn play_instant_for(
        &mut self,
        container: ContainerId,
        name: &str,
        play_time: f32,
    ) -> Option<VoiceKey> {
        let search = self.desc.default_search;
        let request = PlayRequest::instant().with_play_time(play_time);
        self.play_request(container, Target::Name(name), request, search)
    }

    pub fn play_delayed_for(
        &mut self,
        container: ContainerId,
        name: &str,
        delay: f32,
        play_time: f32,
    ) -> Option<VoiceKey> {
        let search = self.desc.default_search;
        let request = PlayRequest::delayed(delay).with_play_time(play_time);
        self.play_request(container, Target::Name(name), request, search)
    }

    /// Stops voice `key` of `target`. Returns false when the entry or voice does not exist.
    pub fn stop_request(
        &mut self,
        container: ContainerId,
        target: Target<'_>,
        mode: StopMode,
        key: VoiceKey,
        search: SearchOptions,
    ) -> bool {
        self.collapse(container, target, Operation::Stop { mode, key }, search)
            .is_some()
    }

    pub fn stop_at_index(
        &mut self,
        container: ContainerId,
        index: usize,
        mode: StopMode,
        key: VoiceKey,
    ) -> bool {
        self.stop_request(container, Target::Index(index), mode, key, SearchOptions::local_only())
    }

    /// Lets the voice finish its current pass through the clip, then destroys it.
    pub fn stop(&mut self, container: ContainerId, name: &str, key: VoiceKey) -> bool {
        let search = self.desc.default_search;
        self.stop_request(container, Target::Name(name), StopMode::Natural, key, search)
    }

    /// Destroys the voice immediately.
    pub fn stop_instant(&mut self, container: ContainerId, name: &str, key: VoiceKey) -> bool {
        let search = self.desc.default_search;
        self.stop_request(container, Target::Name(name), StopMode::Instant, key, search)
    }

    /// Destroys the voice after exactly `delay` seconds.
    ///
    /// A negative delay is accepted but schedules nothing.
    pub fn stop_delayed(
        &mut self,
        container: ContainerId,
        name: &str,
        delay: f32,
        key: VoiceKey,
    ) -> bool {
        let search = self.desc.default_search;
        self.stop_request(container, Target::Name(name), StopMode::Delayed(delay), key, search)
    }

    /// Destroys every live voice in the world. Returns how many were destroyed.
    pub fn stop_all(&mut self) -> usize {
        let count = self.with_context(|tree, cx| tree.destroy_all_voices(cx));
        log::debug!("Stopped {} voice(s)", count);
        count
    }

    /// Whether entry `index` of `container` has a live voice `key`.
    pub fn contains_voice(&self, container: ContainerId, index: usize, key: VoiceKey) -> bool {
        self.tree
            .get(container)
            .and_then(|c| c.entry(index))
            .is_some_and(|e| e.contains_voice(key))
    }

    pub fn find_voice(&self, key: VoiceKey) -> Option<(ContainerId, usize)> {
        self.tree.find_voice(key)
    }

    pub fn voice(&self, key: VoiceKey) -> Option<&Voice> {
        let (container, index) = self.tree.find_voice(key)?;
        self.tree.get(container)?.entry(index)?.voice(key)
    }

    pub fn voice_state(&self, key: VoiceKey) -> Option<VoiceState> {
        self.voice(key).map(Voice::state)
    }

    pub fn live_voice_count(&self) -> usize {
        self.tree
            .iter()
            .flat_map(|c| c.entries())
            .map(|e| e.live_count())
            .sum()
    }

    /// Loudest detection value of the subtree at `container` with every entry placed at
    /// `source`, using the default search flags.
    pub fn audibility(&self, container: ContainerId, source: Vec3, listener: Vec3) -> f32 {
        self.audibility_with(container, source, listener, self.desc.default_search)
    }

    pub fn audibility_with(
        &self,
        container: ContainerId,
        source: Vec3,
        listener: Vec3,
        search: SearchOptions,
    ) -> f32 {
        self.tree.audibility(container, source, listener, search)
    }

    /// Loudest detection value of the subtree at `container`, using container positions as
    /// sources and the world's defaults.
    pub fn audibility_at(&self, container: ContainerId, listener: Vec3) -> f32 {
        self.audibility_at_with(
            container,
            listener,
            self.desc.attention_to_child_position,
            self.desc.default_search,
        )
    }

    pub fn audibility_at_with(
        &self,
        container: ContainerId,
        listener: Vec3,
        attention_to_child_position: bool,
        search: SearchOptions,
    ) -> f32 {
        self.tree
            .audibility_from_positions(container, listener, attention_to_child_position, search)
    }
}

fn container_label(tree: &ContainerTree, id: ContainerId) -> &str {
    tree.get(id).map(Container::name).unwrap_or("?")
}

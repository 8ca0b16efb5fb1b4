use anyhow::{Context, Result};
use audionest::*;

const TICK: f64 = 0.25;

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Debug)
        .init();

    // optional path to a real footstep recording
    let footstep_clip = match std::env::args().nth(1) {
        Some(path) => AudioClip::from_path(&path)
            .with_context(|| format!("Failed to load footstep clip from {}", path))?,
        None => AudioClip::with_length("footsteps", 0.6),
    };
    log::info!(
        "Footstep clip '{}' lasts {:.2}s",
        footstep_clip.name(),
        footstep_clip.length()
    );

    let mut scene = SceneTree::new();
    let guard_node = scene.add_root();
    let radio_node = scene.add_child(guard_node)?;
    let dog_node = scene.add_root();

    let sfx = OutputRoute::new("sfx");
    let footsteps = SoundEntryDesc::new("footsteps")
        .clip(footstep_clip)
        .output(sfx.clone())
        .detection(DetectionSettings {
            loudness: 40.0,
            outer_radius: 8.0,
            ..Default::default()
        });
    let chatter = SoundEntryDesc::new("chatter")
        .clip(AudioClip::with_length("chatter", 3.0))
        .output(sfx.clone())
        .looping(true)
        .detection(DetectionSettings {
            loudness: 70.0,
            outer_radius: 15.0,
            response: ResponseCurve::new(vec![
                CurveKey::new(0.0, 1.0),
                CurveKey::new(0.5, 0.8).with_shape(KeyShape::Smooth),
                CurveKey::new(1.0, 0.0),
            ]),
            ..Default::default()
        });
    let bark = SoundEntryDesc::new("bark")
        .clip(AudioClip::with_length("bark", 0.4))
        .output(sfx)
        .play_delay(0.5);

    let mut world = AudioNestWorld::new(AudioNestDesc::default());
    let guard = world.add_container(
        guard_node,
        ContainerDesc::new("guard")
            .position(Vec3::new(0.0, 0.0, 0.0))
            .entry(footsteps),
    )?;
    world.add_container(
        radio_node,
        ContainerDesc::new("radio")
            .position(Vec3::new(0.5, 1.2, 0.0))
            .entry(chatter),
    )?;
    let dog = world.add_container(
        dog_node,
        ContainerDesc::new("dog")
            .position(Vec3::new(-6.0, 0.0, 3.0))
            .entry(bark),
    )?;
    world.initialize(&scene)?;

    let chatter_key = world
        .play(guard, "chatter")
        .context("Radio chatter did not start")?;
    log::info!("Radio chatter playing as {}", chatter_key);

    let mut player = Vec3::new(20.0, 0.0, 0.0);
    for step in 0..32 {
        if step % 4 == 0 {
            world.play_instant(guard, "footsteps");
        }
        if step == 12 {
            world.play(dog, "bark");
        }
        if step == 20 {
            world.stop(guard, "chatter", chatter_key);
        }

        world.update(TICK);
        player.x -= 0.5;

        let guard_loudness = world.audibility_at(guard, player);
        let dog_loudness = world.audibility_at(dog, player);
        log::info!(
            "t={:.2}s player at {:.1}: guard {:.1}, dog {:.1}, {} voice(s)",
            world.now(),
            player.x,
            guard_loudness,
            dog_loudness,
            world.live_voice_count()
        );

        for event in world.poll_events() {
            match event {
                AudioNestEvent::VoiceDestroyed { key, reason, .. } => {
                    log::info!("Voice {} finished ({:?})", key, reason);
                }
                other => log::debug!("{:?}", other),
            }
        }
    }

    let stopped = world.stop_all();
    log::info!("Patrol over, {} voice(s) cut", stopped);
    Ok(())
}

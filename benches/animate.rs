use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion, black_box};

use skelanim::animation::{
    animate_all, Animation, Animator, BoneTrack, KeyFrame, Skeleton, SkeletonBuilder,
};

use glam::{Mat4, Quat, Vec3};

fn create_chain(bone_count: usize) -> Arc<Skeleton> {
    let mut builder = SkeletonBuilder::new().add_root("bone_0", Mat4::IDENTITY);
    for i in 1..bone_count {
        let name = format!("bone_{i}");
        let parent = format!("bone_{}", i - 1);
        builder = builder.add_bone(&name, &parent, Mat4::from_translation(Vec3::Y));
    }
    Arc::new(builder.build().expect("chain skeleton"))
}

fn create_clip(skeleton: &Arc<Skeleton>, frame_count: usize) -> Arc<Animation> {
    let mut clip = Animation::new("sway", frame_count, 30.0).expect("valid framerate");
    for bone in skeleton.bones() {
        let keys = (0..frame_count)
            .map(|f| {
                let angle = (f as f32 / frame_count as f32 * std::f32::consts::TAU).sin() * 0.2;
                KeyFrame::new(f as f32, Vec3::Y, Quat::from_rotation_z(angle))
            })
            .collect();
        clip.add_track(bone.name.as_str(), BoneTrack::new(keys));
    }
    clip.bind_skeleton(skeleton.clone());
    Arc::new(clip)
}

fn bench_animate_64(c: &mut Criterion) {
    let skeleton = create_chain(64);
    let clip = create_clip(&skeleton, 60);
    let mut animator = Animator::with_animation(clip);

    c.bench_function("animate_64_bones", |b| {
        b.iter(|| {
            animator.animate(black_box(1.0 / 60.0)).expect("all bones tracked");
            black_box(animator.matrices()[63])
        });
    });
}

fn bench_animate_blended_64(c: &mut Criterion) {
    let skeleton = create_chain(64);
    let walk = create_clip(&skeleton, 60);
    let run = create_clip(&skeleton, 30);
    let mut animator = Animator::with_animation(walk);
    let mut target = Animator::with_animation(run);
    animator.set_cross_fade(0.5);

    c.bench_function("animate_blended_64_bones", |b| {
        b.iter(|| {
            animator
                .animate_blended(black_box(1.0 / 60.0), &mut target)
                .expect("all bones tracked");
            black_box(animator.matrices()[63])
        });
    });
}

fn bench_animate_all(c: &mut Criterion) {
    let skeleton = create_chain(64);
    let clip = create_clip(&skeleton, 60);
    let mut animators: Vec<Animator> = (0..256).map(|_| Animator::with_animation(clip.clone())).collect();

    c.bench_function("animate_all_256_instances", |b| {
        b.iter(|| animate_all(black_box(&mut animators), 1.0 / 60.0).expect("all bones tracked"));
    });
}

criterion_group!(benches, bench_animate_64, bench_animate_blended_64, bench_animate_all);
criterion_main!(benches);

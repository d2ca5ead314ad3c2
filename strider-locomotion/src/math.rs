//! Rotation helpers shared by the task, sensors and robots.
use nalgebra::{UnitQuaternion, Vector3};

/// Returns the rotation matrix of `q` as 9 elements in row-major order.
///
/// The last element is the cosine of the angle between the body z-axis and the world
/// z-axis, i.e. how upright the body is.
pub fn matrix_from_quaternion(q: &UnitQuaternion<f64>) -> [f64; 9] {
    let r = q.to_rotation_matrix();
    let m = r.matrix();
    [
        m[(0, 0)],
        m[(0, 1)],
        m[(0, 2)],
        m[(1, 0)],
        m[(1, 1)],
        m[(1, 2)],
        m[(2, 0)],
        m[(2, 1)],
        m[(2, 2)],
    ]
}

/// Roll, pitch and yaw of `q`.
pub fn roll_pitch_yaw(q: &UnitQuaternion<f64>) -> Vector3<f64> {
    let (roll, pitch, yaw) = q.euler_angles();
    Vector3::new(roll, pitch, yaw)
}

/// Expresses a world-frame vector in the heading frame given by `yaw`.
pub fn world_to_heading_frame(v: &Vector3<f64>, yaw: f64) -> Vector3<f64> {
    UnitQuaternion::from_euler_angles(0.0, 0.0, -yaw) * v
}

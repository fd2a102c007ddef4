use nalgebra::{Isometry3, Matrix4, Point3, Translation3, UnitQuaternion, Vector3};
use simba::scalar::{RealField, SubsetOf, SupersetOf};

/// A translation, rotation and (non-uniform) scale, applied to a point in
/// the order scale, then rotate, then translate. This is the same order a
/// model matrix T * R * S applies them in.
///
/// Physics keeps these in f64; the renderer converts to f32 via
/// `nalgebra::convert`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform<T: RealField> {
    translation: Vector3<T>,
    rotation: UnitQuaternion<T>,
    scale: Vector3<T>,
}

impl<T: RealField + Copy> Transform<T> {
    pub fn new(translation: Vector3<T>, rotation: UnitQuaternion<T>, scale: Vector3<T>) -> Self {
        Transform {
            translation,
            rotation,
            scale,
        }
    }

    /// Translation and rotation only; unit scale.
    pub fn from_pose(translation: Vector3<T>, rotation: UnitQuaternion<T>) -> Self {
        Self::new(translation, rotation, Vector3::repeat(T::one()))
    }

    pub fn identity() -> Self {
        Self::from_pose(Vector3::zeros(), UnitQuaternion::identity())
    }

    pub fn translation(&self) -> Vector3<T> {
        self.translation
    }

    pub fn rotation(&self) -> UnitQuaternion<T> {
        self.rotation
    }

    pub fn scale(&self) -> Vector3<T> {
        self.scale
    }

    pub fn set_translation(&mut self, translation: Vector3<T>) {
        self.translation = translation;
    }

    pub fn set_rotation(&mut self, rotation: UnitQuaternion<T>) {
        self.rotation = rotation;
    }

    pub fn set_scale(&mut self, scale: Vector3<T>) {
        self.scale = scale;
    }

    pub fn translation_matrix(&self) -> Matrix4<T> {
        Matrix4::new_translation(&self.translation)
    }

    pub fn rotation_matrix(&self) -> Matrix4<T> {
        self.rotation.to_homogeneous()
    }

    pub fn scale_matrix(&self) -> Matrix4<T> {
        Matrix4::new_nonuniform_scaling(&self.scale)
    }

    /// The full model matrix, T * R * S.
    pub fn to_homogeneous(&self) -> Matrix4<T> {
        self.translation_matrix() * self.rotation_matrix() * self.scale_matrix()
    }

    /// The rigid part of the transform, dropping the scale.
    pub fn isometry(&self) -> Isometry3<T> {
        Isometry3::from_parts(Translation3::from(self.translation), self.rotation)
    }

    pub fn transform_point(&self, pt: &Point3<T>) -> Point3<T> {
        let scaled = Point3::from(pt.coords.component_mul(&self.scale));
        self.isometry().transform_point(&scaled)
    }

    pub fn transform_vector(&self, v: &Vector3<T>) -> Vector3<T> {
        self.rotation.transform_vector(&v.component_mul(&self.scale))
    }

    /// Returns the transform that applies `inner` first and then `self`.
    /// Only exact when `self` has uniform scale, which is all we ever use.
    pub fn append(&self, inner: &Self) -> Self {
        Transform {
            translation: self.transform_point(&Point3::from(inner.translation)).coords,
            rotation: self.rotation * inner.rotation,
            scale: self.scale.component_mul(&inner.scale),
        }
    }
}

impl<T1, T2> SubsetOf<Transform<T2>> for Transform<T1>
where
    T1: RealField + Copy,
    T2: RealField + Copy + SupersetOf<T1>,
{
    #[inline]
    fn to_superset(&self) -> Transform<T2> {
        Transform {
            translation: self.translation.to_superset(),
            rotation: self.rotation.to_superset(),
            scale: self.scale.to_superset(),
        }
    }

    #[inline]
    fn from_superset_unchecked(t: &Transform<T2>) -> Self {
        Transform {
            translation: t.translation.to_subset_unchecked(),
            rotation: t.rotation.to_subset_unchecked(),
            scale: t.scale.to_subset_unchecked(),
        }
    }

    #[inline]
    fn is_in_subset(t: &Transform<T2>) -> bool {
        <Vector3<T1> as SubsetOf<Vector3<T2>>>::is_in_subset(&t.translation)
            && <UnitQuaternion<T1> as SubsetOf<UnitQuaternion<T2>>>::is_in_subset(&t.rotation)
            && <Vector3<T1> as SubsetOf<Vector3<T2>>>::is_in_subset(&t.scale)
    }
}

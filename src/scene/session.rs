//! The scene: a resource table plus an append-only command log.
//!
//! Resource definitions (meshes, images, media, labels, canvases) register their ids in the table
//! and append their defining command to the log. Frame and layout commands only append. The log is
//! what gets serialized; [`Scene::clear_script`] truncates it while the table keeps every id valid,
//! so a long animation can be delivered in chunks that reference earlier resources.

use std::collections::{BTreeMap, BTreeSet};

use glam::{Quat, Vec3};
use rayon::prelude::*;

use crate::foundation::color::Color;
use crate::foundation::error::{SceneError, SceneResult};
use crate::geometry::vertex_buffer::VertexBuffer;
use crate::scene::canvas::{Canvas2D, Canvas3D, Frame2D, Frame3D, LayerSettings, layer_settings_command};
use crate::scene::graph::{Graph, Sparkline};
use crate::scene::label::Label;
use crate::scene::media::{Image, MediaKind, MediaTrack};
use crate::scene::mesh::{Mesh, area_weighted_normals};
use crate::scene::mesh_update::{MeshUpdate, max_abs_difference};
use crate::scene::panel::{DropDownMenu, TextPanel, check_item_index};
use crate::scene::quantize::{QuantizationInfo, QuantizeOpts, quantize_stream, validate_stream};
use crate::script::command::{
    AddCanvas, AddDropDownMenu, AddFrame, AddTextPanel, CanvasCommands, Command,
    ConfigureUserInterface, DefineGrid, DropDownMenuItemDisabled, DropDownMenuItems,
    DropDownMenuSelection, DropDownMenuTitle, FrameCommands, LinkCanvasEvents, PlaceCanvasInGrid,
    SetBackgroundStyle, SetMedia, SetSceneId, SetUiParameters, SimulateKeyPress, TextPanelText,
    measure_command_sizes,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// CSS visibility of a piece of viewer chrome.
pub enum Visibility {
    /// Shown.
    #[default]
    Visible,
    /// Hidden, still taking up space.
    Hidden,
    /// Removed from the layout.
    Collapse,
}

impl Visibility {
    /// CSS keyword.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Visible => "visible",
            Self::Hidden => "hidden",
            Self::Collapse => "collapse",
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "PascalCase")]
/// Playback properties sent in the session header.
pub struct SceneProperties {
    /// Frames per second of the animation.
    pub frame_rate: f32,
    /// Visibility of the status bar.
    pub status_bar_visibility: Visibility,
}

impl Default for SceneProperties {
    fn default() -> Self {
        Self {
            frame_rate: 30.0,
            status_bar_visibility: Visibility::Visible,
        }
    }
}

/// Ids of a created label and of the billboard mesh carrying it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelIds {
    /// Label id (also the texture id of its mesh).
    pub label_id: String,
    /// Mesh to place in frames.
    pub mesh_id: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CanvasKind {
    Canvas3D,
    Canvas2D,
    Graph,
}

#[derive(Clone, Debug)]
struct CanvasEntry {
    kind: CanvasKind,
    media_id: Option<String>,
    frame_ids: BTreeSet<String>,
}

#[derive(Clone, Debug)]
enum LogEntry {
    Mesh(String),
    Update(MeshUpdate),
    Command(Command),
}

#[derive(Clone, Debug, Default)]
struct Counters {
    meshes: usize,
    images: usize,
    canvases: usize,
    labels: usize,
    audio_tracks: usize,
    videos: usize,
    text_panels: usize,
    drop_down_menus: usize,
}

/// Scene under construction.
///
/// ```no_run
/// use scenescript::{Canvas3D, Color, Frame3D, PrimitiveStyle, Scene};
///
/// let mut scene = Scene::new("demo");
/// let mut cube = scene.create_mesh("").with_shared_color(Color::GRAY)?;
/// cube.add_cube(&PrimitiveStyle::default())?;
/// let cube_id = scene.define_mesh(cube)?;
/// let canvas = scene.create_canvas_3d(Canvas3D::new(400, 400))?;
/// scene.add_frame_3d(&canvas, Frame3D::new().add_mesh(cube_id))?;
/// let json = scene.json()?;
/// # Ok::<(), scenescript::SceneError>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct Scene {
    scene_id: String,
    properties: SceneProperties,
    log: Vec<LogEntry>,
    meshes: BTreeMap<String, Mesh>,
    updates: BTreeMap<String, String>,
    images: BTreeSet<String>,
    media: BTreeMap<String, MediaKind>,
    labels: BTreeSet<String>,
    canvases: BTreeMap<String, CanvasEntry>,
    text_panels: BTreeSet<String>,
    drop_down_menus: BTreeMap<String, usize>,
    frame_counters: BTreeMap<String, u32>,
    counters: Counters,
    script_cleared: bool,
}

fn next_id(prefix: &str, counter: &mut usize, taken: impl Fn(&str) -> bool) -> String {
    loop {
        let id = format!("{prefix}-{counter}");
        *counter += 1;
        if !taken(&id) {
            return id;
        }
    }
}

impl Scene {
    /// Empty scene. An empty `scene_id` omits the `SetSceneId` header.
    pub fn new(scene_id: impl Into<String>) -> Self {
        Self {
            scene_id: scene_id.into(),
            ..Self::default()
        }
    }

    /// Scene identifier.
    pub fn scene_id(&self) -> &str {
        &self.scene_id
    }

    /// Playback properties.
    pub fn properties(&self) -> &SceneProperties {
        &self.properties
    }

    /// Frames per second of the animation.
    pub fn set_frame_rate(&mut self, frame_rate: f32) -> SceneResult<()> {
        if !(frame_rate.is_finite() && frame_rate > 0.0) {
            return Err(SceneError::validation(format!(
                "frame rate must be > 0, got {frame_rate}"
            )));
        }
        self.properties.frame_rate = frame_rate;
        Ok(())
    }

    /// Visibility of the status bar.
    pub fn set_status_bar_visibility(&mut self, visibility: Visibility) {
        self.properties.status_bar_visibility = visibility;
    }

    /// Whether [`Scene::clear_script`] has been called.
    pub fn is_script_cleared(&self) -> bool {
        self.script_cleared
    }

    fn is_mesh_id_taken(&self, id: &str) -> bool {
        self.meshes.contains_key(id) || self.updates.contains_key(id)
    }

    fn is_texture_id_taken(&self, id: &str) -> bool {
        self.images.contains(id) || self.labels.contains(id)
    }

    fn claim_mesh_id(&mut self, id: &str) -> SceneResult<String> {
        if id.is_empty() {
            let (meshes, updates) = (&self.meshes, &self.updates);
            return Ok(next_id("Mesh", &mut self.counters.meshes, |id| {
                meshes.contains_key(id) || updates.contains_key(id)
            }));
        }
        if self.is_mesh_id_taken(id) {
            return Err(SceneError::validation(format!(
                "mesh id '{id}' is already defined"
            )));
        }
        Ok(id.to_string())
    }

    fn mesh(&self, mesh_id: &str) -> SceneResult<&Mesh> {
        self.meshes
            .get(mesh_id)
            .ok_or_else(|| SceneError::validation(format!("unknown mesh '{mesh_id}'")))
    }

    fn canvas(&self, canvas_id: &str) -> SceneResult<&CanvasEntry> {
        self.canvases
            .get(canvas_id)
            .ok_or_else(|| SceneError::validation(format!("unknown canvas '{canvas_id}'")))
    }

    fn check_media(&self, media_id: Option<&str>) -> SceneResult<()> {
        if let Some(id) = media_id
            && !self.media.contains_key(id)
        {
            return Err(SceneError::validation(format!("unknown media '{id}'")));
        }
        Ok(())
    }

    /// Empty mesh with the given id, or the next `Mesh-<n>` id when `mesh_id` is empty.
    ///
    /// The mesh is registered by [`Scene::define_mesh`] once its geometry is complete.
    pub fn create_mesh(&mut self, mesh_id: &str) -> Mesh {
        if mesh_id.is_empty() {
            let (meshes, updates) = (&self.meshes, &self.updates);
            let id = next_id("Mesh", &mut self.counters.meshes, |id| {
                meshes.contains_key(id) || updates.contains_key(id)
            });
            Mesh::new(id)
        } else {
            Mesh::new(mesh_id)
        }
    }

    /// Register a mesh and log its definition. Returns the mesh id.
    pub fn define_mesh(&mut self, mesh: Mesh) -> SceneResult<String> {
        let mesh_id = mesh.mesh_id().to_string();
        if mesh_id.is_empty() {
            return Err(SceneError::validation("mesh id must be non-empty"));
        }
        if self.is_mesh_id_taken(&mesh_id) {
            return Err(SceneError::validation(format!(
                "mesh id '{mesh_id}' is already defined"
            )));
        }
        if let Some(texture_id) = mesh.texture_id()
            && !self.is_texture_id_taken(texture_id)
        {
            return Err(SceneError::validation(format!(
                "mesh '{mesh_id}' references unknown texture '{texture_id}'"
            )));
        }
        self.meshes.insert(mesh_id.clone(), mesh);
        self.log.push(LogEntry::Mesh(mesh_id.clone()));
        Ok(mesh_id)
    }

    /// Defined mesh by id.
    pub fn get_mesh(&self, mesh_id: &str) -> Option<&Mesh> {
        self.meshes.get(mesh_id)
    }

    fn next_frame_index(&mut self, base_mesh_id: &str) -> u32 {
        let counter = self
            .frame_counters
            .entry(base_mesh_id.to_string())
            .or_insert(0);
        let index = *counter;
        *counter += 1;
        index
    }

    fn push_update(&mut self, update: MeshUpdate) -> String {
        let id = update.mesh_id().to_string();
        self.updates
            .insert(id.clone(), update.base_mesh_id().to_string());
        self.log.push(LogEntry::Update(update));
        id
    }

    /// Log a vertex update of `base_mesh_id`. Without normals and colors only positions change.
    ///
    /// `update_id` defaults to the next `Mesh-<n>` id.
    pub fn update_mesh(
        &mut self,
        base_mesh_id: &str,
        positions: &[Vec3],
        normals: Option<&[Vec3]>,
        colors: Option<&[Color]>,
        update_id: Option<&str>,
    ) -> SceneResult<String> {
        let base = self.mesh(base_mesh_id)?;
        if base.is_instanced() {
            return Err(SceneError::invalid_state(format!(
                "mesh '{base_mesh_id}' is instanced; use update_instanced_mesh"
            )));
        }
        let expected = base.vertex_count();
        if positions.len() != expected {
            return Err(SceneError::shape_mismatch(
                format!("update of mesh '{base_mesh_id}'"),
                expected,
                positions.len(),
            ));
        }
        let mesh_id = self.claim_mesh_id(update_id.unwrap_or(""))?;
        let frame_index = self.next_frame_index(base_mesh_id);
        let update = MeshUpdate::geometry(
            base_mesh_id.to_string(),
            mesh_id,
            frame_index,
            positions,
            normals,
            colors,
        )?;
        Ok(self.push_update(update))
    }

    /// Log new positions of `base_mesh_id` with normals recomputed from its triangles.
    ///
    /// Normals are area weighted, as in [`Mesh::add_mesh_without_normals`].
    pub fn update_mesh_without_normals(
        &mut self,
        base_mesh_id: &str,
        positions: &[Vec3],
        colors: Option<&[Color]>,
        update_id: Option<&str>,
    ) -> SceneResult<String> {
        let base = self.mesh(base_mesh_id)?;
        if positions.len() != base.vertex_count() {
            return Err(SceneError::shape_mismatch(
                format!("update of mesh '{base_mesh_id}'"),
                base.vertex_count(),
                positions.len(),
            ));
        }
        let normals = area_weighted_normals(positions, base.triangles());
        self.update_mesh(base_mesh_id, positions, Some(&normals), colors, update_id)
    }

    /// Log new instance positions, rotations and colors of an instanced mesh.
    pub fn update_instanced_mesh(
        &mut self,
        base_mesh_id: &str,
        positions: &[Vec3],
        rotations: Option<&[Quat]>,
        colors: Option<&[Color]>,
        update_id: Option<&str>,
    ) -> SceneResult<String> {
        let base = self.mesh(base_mesh_id)?;
        let Some(expected) = base.instance_count() else {
            return Err(SceneError::invalid_state(format!(
                "mesh '{base_mesh_id}' is not instanced"
            )));
        };
        if positions.len() != expected {
            return Err(SceneError::shape_mismatch(
                format!("instance update of mesh '{base_mesh_id}'"),
                expected,
                positions.len(),
            ));
        }
        let mesh_id = self.claim_mesh_id(update_id.unwrap_or(""))?;
        let frame_index = self.next_frame_index(base_mesh_id);
        let update = MeshUpdate::instances(
            base_mesh_id.to_string(),
            mesh_id,
            frame_index,
            positions,
            rotations,
            colors,
        )?;
        Ok(self.push_update(update))
    }

    /// Log new positions; instanced meshes get an instance update.
    pub fn update_mesh_positions(
        &mut self,
        base_mesh_id: &str,
        positions: &[Vec3],
        update_id: Option<&str>,
    ) -> SceneResult<String> {
        if self.mesh(base_mesh_id)?.is_instanced() {
            self.update_instanced_mesh(base_mesh_id, positions, None, None, update_id)
        } else {
            self.update_mesh(base_mesh_id, positions, None, None, update_id)
        }
    }

    fn logged_update(&self, update_id: &str) -> Option<&MeshUpdate> {
        self.log.iter().find_map(|entry| match entry {
            LogEntry::Update(u) if u.mesh_id() == update_id => Some(u),
            _ => None,
        })
    }

    /// Update still present in the log.
    pub fn mesh_update(&self, update_id: &str) -> Option<&MeshUpdate> {
        self.logged_update(update_id)
    }

    /// Updates in the log, in log order.
    pub fn mesh_updates(&self) -> impl Iterator<Item = &MeshUpdate> {
        self.log.iter().filter_map(|entry| match entry {
            LogEntry::Update(u) => Some(u),
            _ => None,
        })
    }

    /// Encode every logged update of each base mesh as keyframes and deltas with an absolute
    /// error budget of `threshold`.
    pub fn quantize_updates(
        &mut self,
        threshold: f32,
    ) -> SceneResult<BTreeMap<String, QuantizationInfo>> {
        self.quantize_updates_with(&QuantizeOpts::absolute(threshold))
    }

    /// Quantize the logged updates, one independent stream per base mesh.
    ///
    /// Any previous quantization of the selected streams is discarded first. All streams are
    /// validated before any update is touched.
    #[tracing::instrument(skip(self, opts), fields(base_mesh_id = ?opts.base_mesh_id))]
    pub fn quantize_updates_with(
        &mut self,
        opts: &QuantizeOpts,
    ) -> SceneResult<BTreeMap<String, QuantizationInfo>> {
        if let Some(id) = &opts.base_mesh_id {
            self.mesh(id)?;
        }

        let mut streams: BTreeMap<String, Vec<&mut MeshUpdate>> = BTreeMap::new();
        for entry in &mut self.log {
            if let LogEntry::Update(update) = entry
                && opts
                    .base_mesh_id
                    .as_deref()
                    .is_none_or(|id| id == update.base_mesh_id())
            {
                streams
                    .entry(update.base_mesh_id().to_string())
                    .or_default()
                    .push(update);
            }
        }

        let mut jobs = Vec::with_capacity(streams.len());
        for (base_mesh_id, mut updates) in streams {
            updates.sort_by_key(|u| u.frame_index());
            validate_stream(&base_mesh_id, &updates)?;
            let mesh_range = self
                .meshes
                .get(&base_mesh_id)
                .map(|m| {
                    m.instance_buffer()
                        .unwrap_or(m.vertex_buffer())
                        .coefficient_range()
                })
                .unwrap_or(0.0);
            let range = opts.representable_range(mesh_range)?;
            jobs.push((base_mesh_id, updates, range));
        }
        for (_, updates, _) in &mut jobs {
            for update in updates.iter_mut() {
                update.clear_quantization();
            }
        }

        jobs.into_par_iter()
            .map(|(base_mesh_id, mut updates, range)| {
                let info = quantize_stream(&base_mesh_id, &mut updates, range, opts)?;
                Ok::<_, SceneError>((base_mesh_id, info))
            })
            .collect()
    }

    /// Buffer the viewer reconstructs for a logged update: keyframe plus dequantized delta.
    pub fn reconstruct_update(&self, update_id: &str) -> SceneResult<VertexBuffer> {
        let update = self.logged_update(update_id).ok_or_else(|| {
            if self.updates.contains_key(update_id) {
                SceneError::invalid_state(format!("update '{update_id}' was cleared from the log"))
            } else {
                SceneError::validation(format!("unknown mesh update '{update_id}'"))
            }
        })?;
        let Some(keyframe_index) = update.keyframe_index() else {
            return Ok(update.vertex_buffer().clone());
        };
        let keyframe = self
            .mesh_updates()
            .find(|u| {
                u.base_mesh_id() == update.base_mesh_id()
                    && u.frame_index() == keyframe_index
                    && !u.is_quantized()
            })
            .ok_or_else(|| {
                SceneError::invalid_state(format!(
                    "keyframe {keyframe_index} of mesh '{}' is not in the log",
                    update.base_mesh_id()
                ))
            })?;
        update.reconstruct(keyframe.vertex_buffer())
    }

    /// Largest absolute difference between a logged update as reconstructed by the viewer and
    /// `reference`.
    pub fn difference_range(&self, update_id: &str, reference: &VertexBuffer) -> SceneResult<f32> {
        let rebuilt = self.reconstruct_update(update_id)?;
        if rebuilt.rows() != reference.rows() {
            return Err(SceneError::shape_mismatch(
                format!("update '{update_id}' vs reference"),
                rebuilt.rows(),
                reference.rows(),
            ));
        }
        if !rebuilt.same_columns(reference) {
            return Err(SceneError::validation(format!(
                "update '{update_id}' has {} columns, reference has {}",
                rebuilt.cols(),
                reference.cols()
            )));
        }
        Ok(max_abs_difference(rebuilt.as_slice(), reference.as_slice()))
    }

    /// Register an image. An empty id gets the next `Image-<n>` id.
    pub fn define_image(&mut self, mut image: Image) -> SceneResult<String> {
        if image.image_id.is_empty() {
            let (images, labels) = (&self.images, &self.labels);
            image.image_id = next_id("Image", &mut self.counters.images, |id| {
                images.contains(id) || labels.contains(id)
            });
        } else if self.is_texture_id_taken(&image.image_id) {
            return Err(SceneError::validation(format!(
                "image id '{}' is already defined",
                image.image_id
            )));
        }
        let id = image.image_id.clone();
        self.images.insert(id.clone());
        self.log.push(LogEntry::Command(image.to_command()));
        Ok(id)
    }

    /// Register an audio track or video. An empty id gets `AudioTrack-<n>` or `Video-<n>`.
    pub fn define_media(&mut self, mut track: MediaTrack) -> SceneResult<String> {
        let kind = track.kind();
        if track.media_id.is_empty() {
            let (prefix, counter) = match kind {
                MediaKind::Audio => ("AudioTrack", &mut self.counters.audio_tracks),
                MediaKind::Video => ("Video", &mut self.counters.videos),
            };
            let media = &self.media;
            track.media_id = next_id(prefix, counter, |id| media.contains_key(id));
        } else if self.media.contains_key(&track.media_id) {
            return Err(SceneError::validation(format!(
                "media id '{}' is already defined",
                track.media_id
            )));
        }
        let id = track.media_id.clone();
        self.media.insert(id.clone(), kind);
        self.log.push(LogEntry::Command(track.to_command()));
        Ok(id)
    }

    /// Register a label and the billboard mesh that displays it.
    pub fn create_label(&mut self, mut label: Label) -> SceneResult<LabelIds> {
        label.validate()?;
        if label.label_id.is_empty() {
            let (images, labels) = (&self.images, &self.labels);
            label.label_id = next_id("Label", &mut self.counters.labels, |id| {
                images.contains(id) || labels.contains(id)
            });
        } else if self.is_texture_id_taken(&label.label_id) {
            return Err(SceneError::validation(format!(
                "label id '{}' is already defined",
                label.label_id
            )));
        }
        let mesh = label.mesh(&self.claim_mesh_id("")?)?;
        self.labels.insert(label.label_id.clone());
        let mesh_id = self.define_mesh(mesh)?;
        self.log
            .push(LogEntry::Command(label.to_command(&mesh_id)));
        Ok(LabelIds {
            label_id: label.label_id,
            mesh_id,
        })
    }

    fn claim_canvas_id(&mut self, id: &str) -> SceneResult<String> {
        if id.is_empty() {
            let canvases = &self.canvases;
            return Ok(next_id("Canvas", &mut self.counters.canvases, |id| {
                canvases.contains_key(id)
            }));
        }
        if self.canvases.contains_key(id) {
            return Err(SceneError::validation(format!(
                "canvas id '{id}' is already defined"
            )));
        }
        Ok(id.to_string())
    }

    /// Add a 3D canvas and log its settings. Returns the canvas id.
    pub fn create_canvas_3d(&mut self, canvas: Canvas3D) -> SceneResult<String> {
        self.check_media(canvas.media_id.as_deref())?;
        let mut settings = Vec::new();
        if let Some(camera) = canvas.camera {
            settings.push(camera.to_command()?);
        }
        if let Some(shading) = canvas.shading {
            settings.push(shading.to_command());
        }
        if let Some(focus_point) = canvas.focus_point {
            settings.push(focus_point.to_command());
        }
        if let Some(ui) = canvas.ui_parameters {
            settings.push(Command::SetUiParameters(SetUiParameters { value: ui }));
        }
        if let Some(media_id) = &canvas.media_id {
            settings.push(Command::SetMedia(SetMedia {
                media_id: media_id.clone(),
            }));
        }

        let canvas_id = self.claim_canvas_id(&canvas.canvas_id)?;
        self.canvases.insert(
            canvas_id.clone(),
            CanvasEntry {
                kind: CanvasKind::Canvas3D,
                media_id: canvas.media_id,
                frame_ids: BTreeSet::new(),
            },
        );
        self.log.push(LogEntry::Command(Command::AddCanvas3D(AddCanvas {
            canvas_id: canvas_id.clone(),
            width: canvas.width,
            height: canvas.height,
            html_id: canvas.html_id,
        })));
        if !settings.is_empty() {
            self.log
                .push(LogEntry::Command(Command::CanvasCommands(CanvasCommands {
                    canvas_id: canvas_id.clone(),
                    commands: settings,
                })));
        }
        Ok(canvas_id)
    }

    /// Add a 2D canvas and log its settings. Returns the canvas id.
    pub fn create_canvas_2d(&mut self, canvas: Canvas2D) -> SceneResult<String> {
        self.check_media(canvas.media_id.as_deref())?;
        let canvas_id = self.claim_canvas_id(&canvas.canvas_id)?;
        let mut settings = vec![Command::SetBackgroundStyle(SetBackgroundStyle {
            value: canvas.background_style,
        })];
        if let Some(media_id) = &canvas.media_id {
            settings.push(Command::SetMedia(SetMedia {
                media_id: media_id.clone(),
            }));
        }
        self.canvases.insert(
            canvas_id.clone(),
            CanvasEntry {
                kind: CanvasKind::Canvas2D,
                media_id: canvas.media_id,
                frame_ids: BTreeSet::new(),
            },
        );
        self.log.push(LogEntry::Command(Command::AddCanvas2D(AddCanvas {
            canvas_id: canvas_id.clone(),
            width: canvas.width,
            height: canvas.height,
            html_id: canvas.html_id,
        })));
        self.log
            .push(LogEntry::Command(Command::CanvasCommands(CanvasCommands {
                canvas_id: canvas_id.clone(),
                commands: settings,
            })));
        Ok(canvas_id)
    }

    /// Add a sparkline graph and log its settings and sparklines. Returns the canvas id.
    ///
    /// Graphs share the canvas id space; they can be placed in the grid and linked, but take no
    /// frames.
    pub fn create_graph(&mut self, graph: Graph) -> SceneResult<String> {
        self.check_media(graph.media_id.as_deref())?;
        let settings = graph.commands()?;
        let canvas_id = self.claim_canvas_id(&graph.canvas_id)?;
        self.canvases.insert(
            canvas_id.clone(),
            CanvasEntry {
                kind: CanvasKind::Graph,
                media_id: graph.media_id,
                frame_ids: BTreeSet::new(),
            },
        );
        self.log.push(LogEntry::Command(Command::AddGraph(AddCanvas {
            canvas_id: canvas_id.clone(),
            width: graph.width,
            height: graph.height,
            html_id: graph.html_id,
        })));
        self.log
            .push(LogEntry::Command(Command::CanvasCommands(CanvasCommands {
                canvas_id: canvas_id.clone(),
                commands: settings,
            })));
        Ok(canvas_id)
    }

    /// Log one more sparkline on an existing graph.
    pub fn add_sparkline(&mut self, canvas_id: &str, sparkline: &Sparkline) -> SceneResult<()> {
        self.canvas_of_kind(canvas_id, CanvasKind::Graph)?;
        let command = sparkline.to_command()?;
        self.log
            .push(LogEntry::Command(Command::CanvasCommands(CanvasCommands {
                canvas_id: canvas_id.to_string(),
                commands: vec![command],
            })));
        Ok(())
    }

    fn canvas_of_kind(&self, canvas_id: &str, kind: CanvasKind) -> SceneResult<&CanvasEntry> {
        let canvas = self.canvas(canvas_id)?;
        if canvas.kind != kind {
            let expected = match kind {
                CanvasKind::Canvas3D => "a 3D canvas",
                CanvasKind::Canvas2D => "a 2D canvas",
                CanvasKind::Graph => "a graph",
            };
            return Err(SceneError::validation(format!(
                "canvas '{canvas_id}' is not {expected}"
            )));
        }
        Ok(canvas)
    }

    fn claim_frame_id(&mut self, canvas_id: &str, frame_id: Option<&str>) -> SceneResult<String> {
        let Some(canvas) = self.canvases.get_mut(canvas_id) else {
            return Err(SceneError::validation(format!("unknown canvas '{canvas_id}'")));
        };
        let id = match frame_id {
            Some(id) if canvas.frame_ids.contains(id) => {
                return Err(SceneError::validation(format!(
                    "frame '{id}' already exists on canvas '{canvas_id}'"
                )));
            }
            Some(id) => id.to_string(),
            None => {
                let mut n = canvas.frame_ids.len();
                loop {
                    let id = n.to_string();
                    if !canvas.frame_ids.contains(&id) {
                        break id;
                    }
                    n += 1;
                }
            }
        };
        canvas.frame_ids.insert(id.clone());
        Ok(id)
    }

    fn push_frame(&mut self, canvas_id: &str, frame_id: String, commands: Vec<Command>) {
        self.log
            .push(LogEntry::Command(Command::CanvasCommands(CanvasCommands {
                canvas_id: canvas_id.to_string(),
                commands: vec![
                    Command::AddFrame(AddFrame {
                        frame_id: frame_id.clone(),
                    }),
                    Command::FrameCommands(FrameCommands { frame_id, commands }),
                ],
            })));
    }

    /// Log a frame of a 3D canvas. Every placed mesh must be a defined mesh or mesh update.
    pub fn add_frame_3d(&mut self, canvas_id: &str, frame: Frame3D) -> SceneResult<String> {
        self.canvas_of_kind(canvas_id, CanvasKind::Canvas3D)?;
        if let Some(unknown) = frame.mesh_ids().find(|id| !self.is_mesh_id_taken(id)) {
            return Err(SceneError::validation(format!(
                "frame on canvas '{canvas_id}' references unknown mesh '{unknown}'"
            )));
        }
        let commands = frame.commands()?;
        let frame_id = self.claim_frame_id(canvas_id, frame.frame_id.as_deref())?;
        self.push_frame(canvas_id, frame_id.clone(), commands);
        Ok(frame_id)
    }

    /// Log a frame of a 2D canvas. Drawn images must be defined; drawing video needs a video
    /// as the canvas media.
    pub fn add_frame_2d(&mut self, canvas_id: &str, frame: Frame2D) -> SceneResult<String> {
        let canvas = self.canvas_of_kind(canvas_id, CanvasKind::Canvas2D)?;
        if frame.draws_video() {
            let has_video = canvas
                .media_id
                .as_deref()
                .and_then(|id| self.media.get(id))
                .is_some_and(|kind| *kind == MediaKind::Video);
            if !has_video {
                return Err(SceneError::validation(format!(
                    "canvas '{canvas_id}' has no video to draw"
                )));
            }
        }
        if let Some(unknown) = frame.image_ids().find(|id| !self.images.contains(*id)) {
            return Err(SceneError::validation(format!(
                "frame on canvas '{canvas_id}' references unknown image '{unknown}'"
            )));
        }
        let commands = frame.commands()?;
        let frame_id = self.claim_frame_id(canvas_id, frame.frame_id.as_deref())?;
        self.push_frame(canvas_id, frame_id.clone(), commands);
        Ok(frame_id)
    }

    /// Canvas-wide layer settings of a 3D canvas.
    pub fn set_layer_settings(
        &mut self,
        canvas_id: &str,
        settings: &BTreeMap<String, LayerSettings>,
    ) -> SceneResult<()> {
        self.canvas_of_kind(canvas_id, CanvasKind::Canvas3D)?;
        let command = layer_settings_command(settings)?;
        self.log
            .push(LogEntry::Command(Command::CanvasCommands(CanvasCommands {
                canvas_id: canvas_id.to_string(),
                commands: vec![command],
            })));
        Ok(())
    }

    /// Lay canvases out on a CSS grid.
    pub fn define_grid(
        &mut self,
        width: impl Into<String>,
        grid_template_rows: impl Into<String>,
        grid_template_columns: impl Into<String>,
    ) {
        self.log.push(LogEntry::Command(Command::DefineGrid(DefineGrid {
            width: width.into(),
            grid_template_rows: grid_template_rows.into(),
            grid_template_columns: grid_template_columns.into(),
        })));
    }

    /// Position a canvas in the grid.
    pub fn place_canvas_in_grid(
        &mut self,
        canvas_id: &str,
        grid_row: impl Into<String>,
        grid_column: impl Into<String>,
    ) -> SceneResult<()> {
        self.canvas(canvas_id)?;
        self.log
            .push(LogEntry::Command(Command::PlaceCanvasInGrid(PlaceCanvasInGrid {
                canvas_id: canvas_id.to_string(),
                grid_row: grid_row.into(),
                grid_column: grid_column.into(),
            })));
        Ok(())
    }

    /// Share input events (camera moves, playback) between canvases.
    pub fn link_canvas_events(&mut self, canvas_ids: &[&str]) -> SceneResult<()> {
        if canvas_ids.len() < 2 {
            return Err(SceneError::validation("linking needs at least two canvases"));
        }
        for id in canvas_ids {
            self.canvas(id)?;
        }
        self.log
            .push(LogEntry::Command(Command::LinkCanvasEvents(LinkCanvasEvents {
                canvas_ids: canvas_ids.iter().map(|id| id.to_string()).collect(),
            })));
        Ok(())
    }

    /// Press `key` on a canvas once the viewer has loaded.
    pub fn simulate_key_press(&mut self, canvas_id: &str, key: impl Into<String>) -> SceneResult<()> {
        self.canvas(canvas_id)?;
        self.log
            .push(LogEntry::Command(Command::SimulateKeyPress(SimulateKeyPress {
                canvas_id: canvas_id.to_string(),
                key: key.into(),
            })));
        Ok(())
    }

    /// Add a text panel to the page and log its initial text. Returns the panel id.
    pub fn create_text_panel(&mut self, panel: TextPanel) -> SceneResult<String> {
        let text_panel_id = if panel.text_panel_id.is_empty() {
            let panels = &self.text_panels;
            next_id("TextPanel", &mut self.counters.text_panels, |id| {
                panels.contains(id)
            })
        } else if self.text_panels.contains(&panel.text_panel_id) {
            return Err(SceneError::validation(format!(
                "text panel id '{}' is already defined",
                panel.text_panel_id
            )));
        } else {
            panel.text_panel_id.clone()
        };
        self.text_panels.insert(text_panel_id.clone());
        self.log
            .push(LogEntry::Command(Command::AddTextPanel(AddTextPanel {
                text_panel_id: text_panel_id.clone(),
                add_input_box: panel.add_input_box,
                html_id: panel.html_id.clone(),
            })));
        for command in panel.commands(&text_panel_id) {
            self.log.push(LogEntry::Command(command));
        }
        Ok(text_panel_id)
    }

    fn text_panel_text(&self, text_panel_id: &str, value: String) -> SceneResult<TextPanelText> {
        if !self.text_panels.contains(text_panel_id) {
            return Err(SceneError::validation(format!(
                "unknown text panel '{text_panel_id}'"
            )));
        }
        Ok(TextPanelText {
            text_panel_id: text_panel_id.to_string(),
            value,
        })
    }

    /// Replace the body text of a text panel.
    pub fn set_text_panel_text(
        &mut self,
        text_panel_id: &str,
        text: impl Into<String>,
    ) -> SceneResult<()> {
        let payload = self.text_panel_text(text_panel_id, text.into())?;
        self.log
            .push(LogEntry::Command(Command::SetTextPanelValue(payload)));
        Ok(())
    }

    /// Replace the title of a text panel.
    pub fn set_text_panel_title(
        &mut self,
        text_panel_id: &str,
        title: impl Into<String>,
    ) -> SceneResult<()> {
        let payload = self.text_panel_text(text_panel_id, title.into())?;
        self.log
            .push(LogEntry::Command(Command::SetTextPanelTitle(payload)));
        Ok(())
    }

    /// Replace the input box contents of a text panel.
    pub fn set_text_panel_input_text(
        &mut self,
        text_panel_id: &str,
        text: impl Into<String>,
    ) -> SceneResult<()> {
        let payload = self.text_panel_text(text_panel_id, text.into())?;
        self.log
            .push(LogEntry::Command(Command::SetTextPanelInputText(payload)));
        Ok(())
    }

    /// Add a drop-down menu to the page and log its entries. Returns the menu id.
    pub fn create_drop_down_menu(&mut self, menu: DropDownMenu) -> SceneResult<String> {
        let drop_down_menu_id = if menu.drop_down_menu_id.is_empty() {
            let menus = &self.drop_down_menus;
            next_id("DropDownMenu", &mut self.counters.drop_down_menus, |id| {
                menus.contains_key(id)
            })
        } else if self.drop_down_menus.contains_key(&menu.drop_down_menu_id) {
            return Err(SceneError::validation(format!(
                "drop-down menu id '{}' is already defined",
                menu.drop_down_menu_id
            )));
        } else {
            menu.drop_down_menu_id.clone()
        };
        let commands = menu.commands(&drop_down_menu_id)?;
        self.drop_down_menus
            .insert(drop_down_menu_id.clone(), menu.items.len());
        self.log
            .push(LogEntry::Command(Command::AddDropDownMenu(AddDropDownMenu {
                drop_down_menu_id: drop_down_menu_id.clone(),
                title: menu.title.clone(),
                html_id: menu.html_id.clone(),
            })));
        for command in commands {
            self.log.push(LogEntry::Command(command));
        }
        Ok(drop_down_menu_id)
    }

    fn drop_down_menu_items(&self, drop_down_menu_id: &str) -> SceneResult<usize> {
        self.drop_down_menus
            .get(drop_down_menu_id)
            .copied()
            .ok_or_else(|| {
                SceneError::validation(format!("unknown drop-down menu '{drop_down_menu_id}'"))
            })
    }

    /// Replace the title of a drop-down menu.
    pub fn set_drop_down_menu_title(
        &mut self,
        drop_down_menu_id: &str,
        title: impl Into<String>,
    ) -> SceneResult<()> {
        self.drop_down_menu_items(drop_down_menu_id)?;
        self.log
            .push(LogEntry::Command(Command::SetDropDownMenuTitle(DropDownMenuTitle {
                drop_down_menu_id: drop_down_menu_id.to_string(),
                value: title.into(),
            })));
        Ok(())
    }

    /// Replace the entries of a drop-down menu.
    pub fn set_drop_down_menu_items<I, S>(
        &mut self,
        drop_down_menu_id: &str,
        items: I,
    ) -> SceneResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.drop_down_menu_items(drop_down_menu_id)?;
        let items: Vec<String> = items.into_iter().map(Into::into).collect();
        self.drop_down_menus
            .insert(drop_down_menu_id.to_string(), items.len());
        self.log
            .push(LogEntry::Command(Command::SetDropDownMenuItems(DropDownMenuItems {
                drop_down_menu_id: drop_down_menu_id.to_string(),
                items,
            })));
        Ok(())
    }

    /// Select an entry of a drop-down menu.
    pub fn set_drop_down_menu_selection(
        &mut self,
        drop_down_menu_id: &str,
        index: u32,
    ) -> SceneResult<()> {
        let item_count = self.drop_down_menu_items(drop_down_menu_id)?;
        check_item_index(drop_down_menu_id, item_count, index)?;
        self.log.push(LogEntry::Command(Command::SetDropDownMenuSelection(
            DropDownMenuSelection {
                drop_down_menu_id: drop_down_menu_id.to_string(),
                index,
            },
        )));
        Ok(())
    }

    /// Grey out (or re-enable) one entry of a drop-down menu.
    pub fn set_drop_down_menu_item_disabled(
        &mut self,
        drop_down_menu_id: &str,
        index: u32,
        disabled: bool,
    ) -> SceneResult<()> {
        let item_count = self.drop_down_menu_items(drop_down_menu_id)?;
        check_item_index(drop_down_menu_id, item_count, index)?;
        self.log.push(LogEntry::Command(Command::SetDropDownMenuItemDisabled(
            DropDownMenuItemDisabled {
                drop_down_menu_id: drop_down_menu_id.to_string(),
                index,
                disable: disabled,
            },
        )));
        Ok(())
    }

    /// Global viewer chrome.
    pub fn configure_user_interface(&mut self, layer_dropdown: Visibility, show_frame_rate: bool) {
        self.log.push(LogEntry::Command(Command::ConfigureUserInterface(
            ConfigureUserInterface {
                layer_dropdown_visibility: layer_dropdown.as_str().to_string(),
                show_frame_rate,
            },
        )));
    }

    /// Drop every logged command. Defined ids stay valid, frame indices keep counting, and the
    /// session header is no longer emitted.
    pub fn clear_script(&mut self) {
        tracing::debug!(commands = self.log.len(), "clearing scene script");
        self.log.clear();
        self.script_cleared = true;
    }

    /// Number of logged entries (excluding the session header).
    pub fn command_count(&self) -> usize {
        self.log.len()
    }

    /// Commands in log order, preceded by the session header until the first clear.
    pub fn commands(&self) -> SceneResult<Vec<Command>> {
        let mut out = Vec::with_capacity(self.log.len() + 2);
        if !self.script_cleared {
            if !self.scene_id.is_empty() {
                out.push(Command::SetSceneId(SetSceneId {
                    scene_id: self.scene_id.clone(),
                }));
            }
            out.push(Command::SetSceneProperties(self.properties.clone()));
        }
        for entry in &self.log {
            out.push(match entry {
                LogEntry::Mesh(id) => self.mesh(id)?.to_command()?,
                LogEntry::Update(update) => update.to_command()?,
                LogEntry::Command(command) => command.clone(),
            });
        }
        Ok(out)
    }

    /// Script as a JSON value.
    pub fn to_json(&self) -> SceneResult<serde_json::Value> {
        Ok(serde_json::to_value(self.commands()?)?)
    }

    /// Script as compact JSON text.
    #[tracing::instrument(skip(self), fields(entries = self.log.len()))]
    pub fn json(&self) -> SceneResult<String> {
        let json = serde_json::to_string(&self.commands()?)?;
        tracing::debug!(bytes = json.len(), "serialized scene script");
        Ok(json)
    }

    /// Serialized bytes per `CommandType`, counting commands nested in canvas and frame scopes.
    pub fn measure_command_size(&self) -> SceneResult<BTreeMap<String, usize>> {
        measure_command_sizes(&self.commands()?)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/session.rs"]
mod tests;

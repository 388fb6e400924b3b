use glam::{Vec2, Vec4};
use slotmap::SlotMap;

use crate::ui::compile;
use crate::ui::component::{
    Dropdown, UiHandle, UiKind, UiNode, LAYER_DROPDOWN, LAYER_DROPDOWN_OPEN,
};
use crate::ui::draw::DrawList;

/// Interaction event emitted by widgets, drained by the application.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    ButtonClicked(UiHandle),
    CheckboxToggled(UiHandle, bool),
    SliderChanged(UiHandle, f32),
    DropdownSelected(UiHandle, usize),
}

/// Owns the component arena, root list and input state of one UI surface.
///
/// Rendering walks every root tree, flattens it, sorts by layer (stable,
/// ascending) and emits draw commands in that order; parents never clip
/// children. Hit-testing walks the same sorted list topmost-first.
pub struct UiManager {
    arena: SlotMap<UiHandle, UiNode>,
    roots: Vec<UiHandle>,
    viewport: Vec2,
    cursor: Vec2,
    /// Slider currently owning the mouse
    captured: Option<UiHandle>,
    events: Vec<UiEvent>,
    next_insertion: u64,
}

impl UiManager {
    #[must_use]
    pub fn new(viewport: Vec2) -> Self {
        Self {
            arena: SlotMap::with_key(),
            roots: Vec::new(),
            viewport,
            cursor: Vec2::new(-1.0, -1.0),
            captured: None,
            events: Vec::new(),
            next_insertion: 0,
        }
    }

    // ========================================================================
    // Tree construction
    // ========================================================================

    /// Inserts a detached component into the arena.
    pub fn create(&mut self, kind: UiKind) -> UiHandle {
        let mut node = UiNode::new(kind);
        node.base.insertion = self.next_insertion;
        self.next_insertion += 1;
        self.arena.insert(node)
    }

    /// Registers a component as a root element.
    pub fn add_element(&mut self, root: UiHandle) {
        if self.arena.contains_key(root) && !self.roots.contains(&root) {
            self.roots.push(root);
        }
    }

    /// Attaches `child` under `parent`, setting the child's back-link.
    pub fn add_child(&mut self, parent: UiHandle, child: UiHandle) {
        if parent == child || !self.arena.contains_key(parent) || !self.arena.contains_key(child) {
            log::error!("ui: invalid add_child request");
            return;
        }
        if let Some(old_parent) = self.arena[child].parent {
            if let Some(node) = self.arena.get_mut(old_parent) {
                node.children.retain(|c| *c != child);
            }
        }
        self.roots.retain(|r| *r != child);
        self.arena[child].parent = Some(parent);
        self.arena[parent].children.push(child);
    }

    /// Removes a component and its entire subtree.
    pub fn remove(&mut self, handle: UiHandle) {
        if let Some(parent) = self.arena.get(handle).and_then(UiNode::parent) {
            if let Some(node) = self.arena.get_mut(parent) {
                node.children.retain(|c| *c != handle);
            }
        }
        self.roots.retain(|r| *r != handle);

        let mut stack = vec![handle];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.arena.remove(current) {
                stack.extend(node.children.iter().copied());
            }
            if self.captured == Some(current) {
                self.captured = None;
            }
        }
    }

    #[must_use]
    pub fn get(&self, handle: UiHandle) -> Option<&UiNode> {
        self.arena.get(handle)
    }

    pub fn get_mut(&mut self, handle: UiHandle) -> Option<&mut UiNode> {
        self.arena.get_mut(handle)
    }

    #[must_use]
    pub fn roots(&self) -> &[UiHandle] {
        &self.roots
    }

    // ========================================================================
    // Compile & render
    // ========================================================================

    /// Recompiles every root tree against a new viewport.
    pub fn set_viewport(&mut self, viewport: Vec2) {
        self.viewport = viewport;
        self.compile();
    }

    #[must_use]
    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Runs the size-compilation pass over all roots.
    pub fn compile(&mut self) {
        compile::compile_tree(&mut self.arena, &self.roots, self.viewport);
    }

    /// Flattens every tree, sorted by `(layer, insertion)` ascending.
    fn sorted_flat_list(&self) -> Vec<UiHandle> {
        let mut flat = Vec::new();
        let mut stack: Vec<UiHandle> = self.roots.iter().rev().copied().collect();
        while let Some(handle) = stack.pop() {
            let Some(node) = self.arena.get(handle) else {
                continue;
            };
            if !node.base.visible {
                continue;
            }
            flat.push(handle);
            stack.extend(node.children.iter().rev().copied());
        }
        flat.sort_by_key(|h| (self.arena[*h].base.layer, self.arena[*h].base.insertion));
        flat
    }

    /// Emits the frame's draw commands in final layer order.
    #[must_use]
    pub fn build_draw_list(&self) -> DrawList {
        let mut list = DrawList::new();
        for handle in self.sorted_flat_list() {
            self.emit(handle, &mut list);
        }
        list
    }

    fn emit(&self, handle: UiHandle, list: &mut DrawList) {
        let node = &self.arena[handle];
        let base = &node.base;
        let (min, max) = base.compiled_rect();
        let fs = base.compiled_font_size;

        match &node.kind {
            UiKind::Panel(panel) => list.push_rect(min, max, panel.color),
            UiKind::Flex(_) | UiKind::Grid(_) => {}
            UiKind::Label(label) => {
                list.push_text(min, fs, label.color, label.text.clone());
            }
            UiKind::Button(button) => {
                let bg = if button.hovered {
                    button.hover_color
                } else {
                    button.color
                };
                list.push_rect(min, max, bg);
                let text_pos = Vec2::new(
                    min.x + 8.0,
                    min.y + (base.compiled_height - fs) * 0.5,
                );
                list.push_text(text_pos, fs, button.text_color, button.label.clone());
            }
            UiKind::Checkbox(checkbox) => {
                let box_size = base.compiled_height;
                let box_max = min + Vec2::splat(box_size);
                list.push_rect(min, box_max, checkbox.box_color);
                if checkbox.checked {
                    let inset = box_size * 0.2;
                    list.push_rect(
                        min + Vec2::splat(inset),
                        box_max - Vec2::splat(inset),
                        checkbox.check_color,
                    );
                }
                let text_pos = Vec2::new(box_max.x + 8.0, min.y + (box_size - fs) * 0.5);
                list.push_text(text_pos, fs, Vec4::ONE, checkbox.label.clone());
            }
            UiKind::Slider(slider) => {
                let track_h = (base.compiled_height * 0.25).max(2.0);
                let track_y = min.y + (base.compiled_height - track_h) * 0.5;
                let track_min = Vec2::new(min.x, track_y);
                let track_max = Vec2::new(max.x, track_y + track_h);
                list.push_rect(track_min, track_max, slider.track_color);

                let fill_w = base.compiled_width * slider.fraction();
                list.push_rect(
                    track_min,
                    Vec2::new(min.x + fill_w, track_max.y),
                    slider.fill_color,
                );

                let knob_w = (base.compiled_height * 0.5).max(6.0);
                let knob_x = min.x + fill_w - knob_w * 0.5;
                list.push_rect(
                    Vec2::new(knob_x, min.y),
                    Vec2::new(knob_x + knob_w, max.y),
                    slider.knob_color,
                );
            }
            UiKind::Dropdown(dropdown) => {
                list.push_rect(min, max, dropdown.color);
                let text_pos = Vec2::new(min.x + 8.0, min.y + (base.compiled_height - fs) * 0.5);
                if let Some(selected) = dropdown.options.get(dropdown.selected) {
                    list.push_text(text_pos, fs, dropdown.text_color, selected.clone());
                }

                if dropdown.open {
                    let row_h = base.compiled_height;
                    let expanded_min = Vec2::new(min.x, max.y);
                    let expanded_max = Vec2::new(
                        max.x,
                        max.y + dropdown.expanded_height(row_h),
                    );
                    // Opaque cover first so the list occludes siblings
                    // without clipping.
                    let mut cover = dropdown.option_color;
                    cover.w = 1.0;
                    list.push_rect(expanded_min, expanded_max, cover);

                    for (i, option) in dropdown.options.iter().enumerate() {
                        let row_min = Vec2::new(min.x, max.y + i as f32 * row_h);
                        let row_pos = Vec2::new(row_min.x + 8.0, row_min.y + (row_h - fs) * 0.5);
                        list.push_text(row_pos, fs, dropdown.text_color, option.clone());
                    }
                }
            }
        }
    }

    // ========================================================================
    // Input
    // ========================================================================

    /// The rectangle used for hit-testing; an open dropdown extends over
    /// its option list.
    fn hit_rect(&self, handle: UiHandle) -> (Vec2, Vec2) {
        let node = &self.arena[handle];
        let (min, mut max) = node.base.compiled_rect();
        if let UiKind::Dropdown(dropdown) = &node.kind {
            if dropdown.open {
                max.y += dropdown.expanded_height(node.base.compiled_height);
            }
        }
        (min, max)
    }

    fn contains(&self, handle: UiHandle, point: Vec2) -> bool {
        let (min, max) = self.hit_rect(handle);
        point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
    }

    /// Dispatches a cursor move. Returns `true` when the UI consumed it.
    pub fn on_mouse_move(&mut self, pos: Vec2) -> bool {
        self.cursor = pos;

        // A dragging slider owns the mouse regardless of the cursor.
        if let Some(captured) = self.captured {
            self.update_slider_from_cursor(captured);
            return true;
        }

        let flat = self.sorted_flat_list();
        let mut handled = false;
        for &handle in flat.iter().rev() {
            let inside = !handled && self.contains(handle, pos);
            if let UiKind::Button(button) = &mut self.arena[handle].kind {
                button.hovered = inside;
                if !inside {
                    button.pressed = false;
                }
            }
            if inside {
                handled = true;
            }
        }
        handled
    }

    /// Dispatches a mouse press or release at `pos`. Returns `true` when
    /// the topmost element under the cursor consumed the event.
    pub fn on_mouse_button(&mut self, pressed: bool, pos: Vec2) -> bool {
        self.cursor = pos;

        if !pressed {
            if let Some(captured) = self.captured.take() {
                if let Some(node) = self.arena.get_mut(captured) {
                    if let UiKind::Slider(slider) = &mut node.kind {
                        slider.dragging = false;
                    }
                }
                return true;
            }
        }

        let flat = self.sorted_flat_list();
        for &handle in flat.iter().rev() {
            if !self.contains(handle, pos) {
                continue;
            }
            if self.dispatch_button(handle, pressed, pos) {
                return true;
            }
        }

        // A click elsewhere closes any open dropdown.
        if pressed {
            self.close_all_dropdowns();
        }
        false
    }

    fn dispatch_button(&mut self, handle: UiHandle, pressed: bool, pos: Vec2) -> bool {
        let row_height = self.arena[handle].base.compiled_height;
        let (_, rect_max) = self.arena[handle].base.compiled_rect();

        match &mut self.arena[handle].kind {
            UiKind::Button(button) => {
                if pressed {
                    button.pressed = true;
                } else if button.pressed {
                    button.pressed = false;
                    self.events.push(UiEvent::ButtonClicked(handle));
                }
                true
            }
            UiKind::Checkbox(checkbox) => {
                if pressed {
                    checkbox.checked = !checkbox.checked;
                    let checked = checkbox.checked;
                    self.events.push(UiEvent::CheckboxToggled(handle, checked));
                }
                true
            }
            UiKind::Slider(slider) => {
                if pressed {
                    slider.dragging = true;
                    self.captured = Some(handle);
                    self.update_slider_from_cursor(handle);
                }
                true
            }
            UiKind::Dropdown(dropdown) => {
                if !pressed {
                    return true;
                }
                if pos.y <= rect_max.y {
                    // Header click toggles the list; the layer change makes
                    // the open list sort above sibling overlays.
                    dropdown.open = !dropdown.open;
                    let open = dropdown.open;
                    self.arena[handle].base.layer = if open {
                        LAYER_DROPDOWN_OPEN
                    } else {
                        LAYER_DROPDOWN
                    };
                } else {
                    let row = ((pos.y - rect_max.y) / row_height).floor() as usize;
                    if row < dropdown.options.len() {
                        dropdown.selected = row;
                        dropdown.open = false;
                        self.events.push(UiEvent::DropdownSelected(handle, row));
                        self.arena[handle].base.layer = LAYER_DROPDOWN;
                    }
                }
                true
            }
            UiKind::Panel(_) => true,
            UiKind::Label(_) | UiKind::Flex(_) | UiKind::Grid(_) => false,
        }
    }

    fn update_slider_from_cursor(&mut self, handle: UiHandle) {
        let Some(node) = self.arena.get_mut(handle) else {
            return;
        };
        let (min, _) = node.base.compiled_rect();
        let width = node.base.compiled_width.max(1.0);
        if let UiKind::Slider(slider) = &mut node.kind {
            let fraction = ((self.cursor.x - min.x) / width).clamp(0.0, 1.0);
            let value = slider.min + fraction * (slider.max - slider.min);
            if (value - slider.value).abs() > f32::EPSILON {
                slider.value = value;
                self.events.push(UiEvent::SliderChanged(handle, value));
            }
        }
    }

    fn close_all_dropdowns(&mut self) {
        let handles: Vec<UiHandle> = self.arena.keys().collect();
        for handle in handles {
            if let UiKind::Dropdown(dropdown) = &mut self.arena[handle].kind {
                if dropdown.open {
                    dropdown.open = false;
                    self.arena[handle].base.layer = LAYER_DROPDOWN;
                }
            }
        }
    }

    /// Drains the interaction events collected since the last call.
    pub fn poll_events(&mut self) -> Vec<UiEvent> {
        std::mem::take(&mut self.events)
    }

    /// Read-only dropdown accessor used by render-order assertions.
    #[must_use]
    pub fn dropdown(&self, handle: UiHandle) -> Option<&Dropdown> {
        match &self.arena.get(handle)?.kind {
            UiKind::Dropdown(d) => Some(d),
            _ => None,
        }
    }

    /// The flattened render order (ascending layer, stable), for tests and
    /// the GPU renderer.
    #[must_use]
    pub fn render_order(&self) -> Vec<UiHandle> {
        self.sorted_flat_list()
    }
}

//! Builds a small screen, draws one frame onto a recording surface and
//! prints the resulting geometry and draw commands.
//!
//! Run with `RUST_LOG=trellis=trace` to see the layout flushes.

use trellis::prelude::*;

fn main() -> Result<()> {
    env_logger::init();

    let mut pipeline = RenderPipeline::new(
        RenderConfig::new()
            .viewport(320.0, 240.0)
            .paint_overflow_indicator(true),
    );
    pipeline.tree_mut().set_text_measurer(MonospaceMeasurer::new());

    let tree = pipeline.tree_mut();
    let root = tree.insert_node(ColoredBox::new(Color::rgb(0.08, 0.08, 0.12)));
    let padding = tree.insert_node(Padding::new(12.0));
    let column = tree.insert_node(
        Flex::column()
            .spacing(8.0)
            .cross_axis_alignment(CrossAxisAlignment::Stretch),
    );
    tree.append_child(root, padding)?;
    tree.append_child(padding, column)?;

    let title = tree.insert_node(Paragraph::new("trellis layout dump").with_style(TextStyle::new(16.0)));
    tree.append_child(column, title)?;

    let chips = tree.insert_node(Wrap::default().spacing(6.0).run_spacing(6.0));
    tree.append_child(column, chips)?;
    for width in [60.0, 90.0, 40.0, 120.0, 70.0] {
        let chip = tree.insert_node(ColoredBox::new(Color::from_hex(0x3F51B5)));
        let size = tree.insert_node(ConstrainedBox::tight_for(Some(width), Some(24.0)));
        tree.append_child(chip, size)?;
        tree.append_child(chips, chip)?;
    }

    let body = tree.insert_node(Stack::new());
    tree.append_child(column, body)?;
    tree.set_parent_data(body, ParentDataKind::flexible(1))?;
    let fill = tree.insert_node(ColoredBox::new(Color::rgb(0.2, 0.2, 0.25)));
    tree.append_child(body, fill)?;
    tree.set_parent_data(fill, StackPosition::fill())?;
    let badge = tree.insert_node(ConstrainedBox::tight_for(Some(32.0), Some(32.0)));
    tree.append_child(body, badge)?;
    tree.set_parent_data(badge, StackPosition::new().right(8.0).bottom(8.0))?;

    pipeline.set_root(root)?;

    let mut surface = RecordingSurface::new();
    let stats = pipeline.draw_frame(&mut surface)?;

    let tree = pipeline.tree();
    for (name, id) in [
        ("root", root),
        ("column", column),
        ("title", title),
        ("chips", chips),
        ("body", body),
        ("badge", badge),
    ] {
        println!(
            "{name:>8}: size {:?} at {:?}",
            tree.size(id)?,
            tree.offset(id)?
        );
    }
    for child in tree.children(chips) {
        println!(
            "    chip at {:?} in run {:?}",
            tree.offset(child)?,
            tree.parent_data(child)?.run_index()
        );
    }

    println!("\n{} draw commands:", surface.commands().len());
    for command in surface.commands() {
        println!("  {command:?}");
    }
    println!(
        "\n{} layouts, {} skipped, {} nodes painted",
        stats.layouts_executed, stats.layouts_skipped, stats.nodes_painted
    );
    Ok(())
}

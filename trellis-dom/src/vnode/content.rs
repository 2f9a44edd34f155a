/// What a virtual element holds: nothing, a text run, or child nodes.
#[derive(Debug, Clone, Default)]
pub enum Content {
    #[default]
    None,
    Text(String),
    Children(Vec<super::VNode>),
}

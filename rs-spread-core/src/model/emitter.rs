/// Interleaves groups into one flat list.
///
/// Takes one item from every non-exhausted group in group order, then
/// starts over, until every group is exhausted. The output holds each
/// input item exactly once.
///
/// Example: `[[a1, a2, a3], [], [c1]]` → `[a1, c1, a2, a3]`
pub fn round_robin<G, T>(groups: G) -> Vec<T>
where
	G: IntoIterator,
	G::Item: IntoIterator<Item = T>,
{
	let mut cursors: Vec<_> = groups.into_iter().map(IntoIterator::into_iter).collect();
	let mut output = Vec::new();

	while !cursors.is_empty() {
		cursors.retain_mut(|cursor| match cursor.next() {
			Some(item) => {
				output.push(item);
				true
			}
			None => false,
		});
	}

	output
}

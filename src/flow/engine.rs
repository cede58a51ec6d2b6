/*! Edmonds-Karp maximum flow on a dense capacity matrix.

[MaxFlowEngine] represents the graph as a `|V| x |V|` capacity matrix
plus per-node adjacency lists, and maintains a signed residual flow
matrix with `flow[v][u] == -flow[u][v]`. This mirrors the matrix
representation the network needs (as opposed to an object graph with
parent pointers, which `spec.md` §9 explicitly rules out) and keeps
augmenting-path search a simple BFS over residual capacity.
*/

use std::collections::VecDeque;

/// Sentinel parent value marking the BFS source, distinct from
/// "undiscovered" (`None`).
const SOURCE_SENTINEL: isize = -2;
const UNDISCOVERED: isize = -1;

/// A directed flow network with integer capacities, solved by
/// repeated BFS augmenting-path search (Edmonds-Karp).
pub struct MaxFlowEngine {
    capacity: Vec<Vec<i64>>,
    flow: Vec<Vec<i64>>,
    neighbors: Vec<Vec<usize>>,
}

impl MaxFlowEngine {
    pub fn new(num_nodes: usize) -> Self {
        MaxFlowEngine {
            capacity: vec![vec![0; num_nodes]; num_nodes],
            flow: vec![vec![0; num_nodes]; num_nodes],
            neighbors: vec![Vec::new(); num_nodes],
        }
    }

    /// Add a directed edge `u -> v` with the given capacity. Registers
    /// both endpoints in each other's adjacency list so that BFS can
    /// also discover the reverse residual edge once flow is pushed
    /// along the forward edge.
    pub fn add_edge(&mut self, u: usize, v: usize, capacity: i64) {
        self.capacity[u][v] += capacity;
        self.neighbors[u].push(v);
        self.neighbors[v].push(u);
    }

    pub fn capacity(&self, u: usize, v: usize) -> i64 {
        self.capacity[u][v]
    }

    pub fn flow(&self, u: usize, v: usize) -> i64 {
        self.flow[u][v]
    }

    /// Residual capacity of `u -> v`: `capacity[u][v] - flow[u][v]`.
    pub fn residual(&self, u: usize, v: usize) -> i64 {
        self.capacity[u][v] - self.flow[u][v]
    }

    /// Directly adjust the flow along `u -> v` (and its antisymmetric
    /// counterpart), bypassing the BFS search. Used by best-fit-descent
    /// repair to un-route and re-route flow after the max-flow stage.
    pub fn set_flow(&mut self, u: usize, v: usize, value: i64) {
        self.flow[u][v] = value;
        self.flow[v][u] = -value;
    }

    pub fn add_flow(&mut self, u: usize, v: usize, delta: i64) {
        self.flow[u][v] += delta;
        self.flow[v][u] -= delta;
    }

    /// Run Edmonds-Karp from `source` to `sink`, returning the total
    /// flow found. `O(V * E^2)` worst case.
    pub fn max_flow(&mut self, source: usize, sink: usize) -> i64 {
        let mut total = 0;
        loop {
            let (bottleneck, parent) = self.bfs(source, sink);
            if bottleneck == 0 {
                break;
            }
            total += bottleneck;
            let mut v = sink;
            while v != source {
                let u = parent[v] as usize;
                self.add_flow(u, v, bottleneck);
                v = u;
            }
        }
        total
    }

    /// BFS augmenting-path search. Returns the bottleneck capacity of
    /// the discovered path (`0` if `sink` is unreachable) and the
    /// parent table used to walk the path back from `sink`.
    fn bfs(&self, source: usize, sink: usize) -> (i64, Vec<isize>) {
        let n = self.capacity.len();
        let mut parent = vec![UNDISCOVERED; n];
        parent[source] = SOURCE_SENTINEL;
        let mut bottleneck = vec![0i64; n];
        bottleneck[source] = i64::MAX;

        let mut queue = VecDeque::new();
        queue.push_back(source);
        while let Some(u) = queue.pop_front() {
            for &v in &self.neighbors[u] {
                if self.residual(u, v) > 0 && parent[v] == UNDISCOVERED {
                    parent[v] = u as isize;
                    bottleneck[v] = bottleneck[u].min(self.residual(u, v));
                    if v == sink {
                        return (bottleneck[sink], parent);
                    }
                    queue.push_back(v);
                }
            }
        }
        (0, parent)
    }
}

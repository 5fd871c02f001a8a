use lox_bytecode::*;
use pretty_assertions::assert_eq;

fn listing(src: &str) -> String {
    let chunk = compile(src).expect("compile failed");
    disassemble(&chunk, "script").expect("disassembly failed")
}

#[test]
fn test_globals_listing() {
    assert_eq!(
        listing("var a = 1;\nprint a;"),
        "== script ==\n\
         0000    1 OP_CONSTANT         1 '1'\n\
         0002    | OP_DEFINE_GLOBAL    0 'a'\n\
         0004    2 OP_GET_GLOBAL       2 'a'\n\
         0006    | OP_PRINT\n\
         0007    | OP_RETURN\n"
    );
}

#[test]
fn test_if_else_listing() {
    assert_eq!(
        listing("if (true) print 1; else print 2;"),
        "== script ==\n\
         0000    1 OP_TRUE\n\
         0001    | OP_JUMP_IF_FALSE    1 -> 11\n\
         0004    | OP_POP\n\
         0005    | OP_CONSTANT         0 '1'\n\
         0007    | OP_PRINT\n\
         0008    | OP_JUMP             8 -> 15\n\
         0011    | OP_POP\n\
         0012    | OP_CONSTANT         1 '2'\n\
         0014    | OP_PRINT\n\
         0015    | OP_RETURN\n"
    );
}

#[test]
fn test_loop_jumps_back_to_condition() {
    let listing = listing("var i = 0; while (i < 2) i = i + 1;");
    assert!(listing.contains("0004    | OP_GET_GLOBAL       2 'i'\n"));
    assert!(listing.contains("0021    | OP_LOOP            21 -> 4\n"));
}

#[test]
fn test_locals_listing_uses_slots() {
    let listing = listing("{ var a = \"x\"; a = a + a; }");
    assert!(listing.contains("OP_GET_LOCAL        0\n"));
    assert!(listing.contains("OP_SET_LOCAL        0\n"));
    assert!(!listing.contains("GLOBAL"));
}
